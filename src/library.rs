//! Library Data Service
//!
//! Reads go through per-table caches; writes hit the store first and then
//! refresh or invalidate the affected cache entries.
//!
//! Cache keys are natural keys (email for users, ISBN for books, normalized
//! query text for searches), never row ids. The search cache tracks no
//! dependencies on individual books, so any write that could change a listing
//! clears it entirely.
//!
//! Point lookups cache absence too: a missing user or book is stored as
//! `None` and served until it expires or a write for that key replaces it.

use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::{CacheStats, Clock, ExpiringCache};
use crate::config::CacheConfig;
use crate::error::{LibraryError, Result};
use crate::models::{Book, NewBook, NewUser, User};
use crate::store::LibraryStore;

/// Statistics for the three library caches.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryCacheStats {
    pub users: CacheStats,
    pub books: CacheStats,
    pub searches: CacheStats,
}

/// The library data service.
pub struct Library {
    store: Arc<dyn LibraryStore>,
    users: ExpiringCache<String, Option<User>>,
    books: ExpiringCache<String, Option<Book>>,
    searches: ExpiringCache<String, Vec<Book>>,
}

impl Library {
    /// Builds the service over `store` with one cache per table.
    ///
    /// Fails if any configured TTL is negative.
    pub fn new(store: Arc<dyn LibraryStore>, config: &CacheConfig) -> Result<Self> {
        Ok(Self {
            store,
            users: ExpiringCache::try_from_secs(config.user_ttl_secs)?.named("users"),
            books: ExpiringCache::try_from_secs(config.book_ttl_secs)?.named("books"),
            searches: ExpiringCache::try_from_secs(config.search_ttl_secs)?.named("searches"),
        })
    }

    /// Points every cache at `clock`.
    pub fn with_clock<C: Clock + Clone + 'static>(self, clock: C) -> Self {
        Self {
            store: self.store,
            users: self.users.with_clock(clock.clone()),
            books: self.books.with_clock(clock.clone()),
            searches: self.searches.with_clock(clock),
        }
    }

    // == Books ==

    /// Adds a book, caches it under its ISBN and drops all cached searches.
    pub fn add_book(&self, book: NewBook) -> Result<Book> {
        if let Some(msg) = book.validate() {
            return Err(LibraryError::InvalidRequest(msg));
        }

        let book = self.store.insert_book(&book)?;
        self.books.put(book.isbn.clone(), Some(book.clone()));
        self.searches.invalidate_all();

        info!(title = %book.title, isbn = %book.isbn, "book added");
        Ok(book)
    }

    /// Finds books whose title or author contains `query`, ignoring case.
    ///
    /// Results are cached under the trimmed, lower-cased query. Every book in
    /// a freshly loaded result is also cached by ISBN.
    pub fn search_books(&self, query: &str) -> Result<Vec<Book>> {
        let key = normalize_query(query);
        self.searches.get(key, |key| -> Result<Vec<Book>> {
            let books = self.store.search_books(key)?;
            for book in &books {
                self.books.put(book.isbn.clone(), Some(book.clone()));
            }
            Ok(books)
        })
    }

    pub fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        self.books.get(isbn.to_string(), |isbn| -> Result<Option<Book>> {
            self.store.find_book_by_isbn(isbn)
        })
    }

    // == Users ==

    /// Adds a user and caches it under its email.
    pub fn add_user(&self, user: NewUser) -> Result<User> {
        if let Some(msg) = user.validate() {
            return Err(LibraryError::InvalidRequest(msg));
        }

        let user = self.store.insert_user(&user)?;
        self.users.put(user.email.clone(), Some(user.clone()));

        info!(name = %user.name, "user added");
        Ok(user)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.users.get(email.to_string(), |email| -> Result<Option<User>> {
            self.store.find_user_by_email(email)
        })
    }

    // == Loans ==

    /// Lends a copy, then caches the updated book and drops cached searches.
    pub fn borrow_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let book = self.store.borrow_book(user_id, book_id).map_err(|err| {
            warn!(user_id, book_id, error = %err, "borrow rejected");
            err
        })?;
        self.refresh_book(&book);

        info!(user_id, book_id, "book borrowed");
        Ok(book)
    }

    /// Takes a copy back, then caches the updated book and drops cached searches.
    pub fn return_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let book = self.store.return_book(user_id, book_id).map_err(|err| {
            warn!(user_id, book_id, error = %err, "return rejected");
            err
        })?;
        self.refresh_book(&book);

        info!(user_id, book_id, "book returned");
        Ok(book)
    }

    // == Stats ==

    pub fn cache_stats(&self) -> LibraryCacheStats {
        LibraryCacheStats {
            users: self.users.stats(),
            books: self.books.stats(),
            searches: self.searches.stats(),
        }
    }

    /// Availability changed: the cached book is stale and so is any listing.
    fn refresh_book(&self, book: &Book) {
        self.books.put(book.isbn.clone(), Some(book.clone()));
        self.searches.invalidate_all();
    }
}

/// Search cache key for a user query.
fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}
