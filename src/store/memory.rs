//! In-Memory Store
//!
//! A `LibraryStore` kept entirely in process. It mirrors the SQLite store's
//! semantics and counts authoritative reads, which lets tests observe whether
//! a lookup was served by a cache or reached the store. Reads can also be made
//! to fail on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{LibraryError, Result};
use crate::models::{Book, NewBook, NewUser, User};
use crate::store::LibraryStore;

#[derive(Debug, Clone)]
struct Loan {
    user_id: i64,
    book_id: i64,
    return_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Tables {
    books: Vec<Book>,
    users: Vec<User>,
    loans: Vec<Loan>,
}

/// In-process library store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read queries served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes every subsequent read fail with a database error until cleared.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn begin_read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LibraryError::Database(rusqlite::Error::InvalidQuery));
        }
        Ok(())
    }
}

impl LibraryStore for MemoryStore {
    fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let mut tables = self.tables.lock();
        if tables.books.iter().any(|b| b.isbn == book.isbn) {
            return Err(LibraryError::Conflict(format!(
                "book with ISBN {} already exists",
                book.isbn
            )));
        }

        let book = book.clone().with_id(tables.books.len() as i64 + 1);
        tables.books.push(book.clone());
        Ok(book)
    }

    fn search_books(&self, pattern: &str) -> Result<Vec<Book>> {
        self.begin_read()?;
        let needle = pattern.to_lowercase();
        let tables = self.tables.lock();
        Ok(tables
            .books
            .iter()
            .filter(|b| {
                b.title.to_lowercase().contains(&needle) || b.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.begin_read()?;
        let tables = self.tables.lock();
        Ok(tables.books.iter().find(|b| b.isbn == isbn).cloned())
    }

    fn insert_user(&self, user: &NewUser) -> Result<User> {
        let mut tables = self.tables.lock();
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(LibraryError::Conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        let user = user.clone().with_id(tables.users.len() as i64 + 1);
        tables.users.push(user.clone());
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.begin_read()?;
        let tables = self.tables.lock();
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    fn borrow_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let mut tables = self.tables.lock();
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(LibraryError::NotFound(format!("user {}", user_id)));
        }

        let book = tables
            .books
            .iter_mut()
            .find(|b| b.id == book_id && b.copies_available > 0)
            .ok_or(LibraryError::NotAvailable(book_id))?;
        book.copies_available -= 1;
        let book = book.clone();

        tables.loans.push(Loan {
            user_id,
            book_id,
            return_date: None,
        });
        Ok(book)
    }

    fn return_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let mut tables = self.tables.lock();
        let loan = tables
            .loans
            .iter_mut()
            .find(|l| l.user_id == user_id && l.book_id == book_id && l.return_date.is_none())
            .ok_or(LibraryError::NoActiveLoan { user_id, book_id })?;
        loan.return_date = Some(Utc::now());

        let book = tables
            .books
            .iter_mut()
            .find(|b| b.id == book_id)
            .ok_or_else(|| LibraryError::NotFound(format!("book {}", book_id)))?;
        book.copies_available += 1;
        Ok(book.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_counted() {
        let store = MemoryStore::new();
        store.find_user_by_email("a@b.c").unwrap();
        store.search_books("x").unwrap();
        assert_eq!(store.reads(), 2);
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let store = MemoryStore::new();
        store
            .insert_book(&NewBook::new(
                "Émile, ou De l'éducation",
                "Jean-Jacques Rousseau",
                1,
                "9782080700179",
            ))
            .unwrap();

        assert_eq!(store.search_books("ÉMILE").unwrap().len(), 1);
        assert_eq!(store.search_books("émile").unwrap().len(), 1);
    }

    #[test]
    fn test_failing_reads() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        assert!(matches!(
            store.find_book_by_isbn("1"),
            Err(LibraryError::Database(_))
        ));

        store.set_fail_reads(false);
        assert!(store.find_book_by_isbn("1").unwrap().is_none());
    }

    #[test]
    fn test_borrow_and_return_round() {
        let store = MemoryStore::new();
        let book = store
            .insert_book(&NewBook::new("To Kill a Mockingbird", "Harper Lee", 1, "9780446310789"))
            .unwrap();
        let user = store
            .insert_user(&NewUser::new("John Doe", "john@example.com", "ACTIVE"))
            .unwrap();

        assert_eq!(store.borrow_book(user.id, book.id).unwrap().copies_available, 0);
        assert!(matches!(
            store.borrow_book(user.id, book.id),
            Err(LibraryError::NotAvailable(_))
        ));
        assert_eq!(store.return_book(user.id, book.id).unwrap().copies_available, 1);
        assert!(matches!(
            store.return_book(user.id, book.id),
            Err(LibraryError::NoActiveLoan { .. })
        ));
    }

    #[test]
    fn test_duplicate_keys_conflict() {
        let store = MemoryStore::new();
        store.insert_book(&NewBook::new("A", "B", 1, "1")).unwrap();
        store.insert_user(&NewUser::new("A", "a@b.c", "ACTIVE")).unwrap();

        assert!(matches!(
            store.insert_book(&NewBook::new("C", "D", 1, "1")),
            Err(LibraryError::Conflict(_))
        ));
        assert!(matches!(
            store.insert_user(&NewUser::new("C", "a@b.c", "ACTIVE")),
            Err(LibraryError::Conflict(_))
        ));
    }
}
