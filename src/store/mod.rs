//! Backing Store Module
//!
//! The authoritative data layer behind the caches. Everything here is
//! synchronous; callers on an async runtime move calls onto a blocking thread.

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Book, NewBook, NewUser, User};

/// Synchronous data-access interface for the library tables.
pub trait LibraryStore: Send + Sync {
    /// Inserts a book and returns it with its assigned id.
    ///
    /// Fails with `Conflict` if the ISBN is already catalogued.
    fn insert_book(&self, book: &NewBook) -> Result<Book>;

    /// Returns books whose title or author contains `pattern`, ignoring case.
    fn search_books(&self, pattern: &str) -> Result<Vec<Book>>;

    fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>>;

    /// Inserts a user and returns it with its assigned id.
    ///
    /// Fails with `Conflict` if the email is already registered.
    fn insert_user(&self, user: &NewUser) -> Result<User>;

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Lends one copy of a book in a single transaction.
    ///
    /// Returns the book as it stands after the loan. Fails with
    /// `NotAvailable` if the book is missing or has no copies left, and with
    /// `NotFound` for an unknown user. Nothing is written on failure.
    fn borrow_book(&self, user_id: i64, book_id: i64) -> Result<Book>;

    /// Closes the user's open loan for a book and restocks the copy, in a
    /// single transaction.
    ///
    /// Fails with `NoActiveLoan` when there is no open loan.
    fn return_book(&self, user_id: i64, book_id: i64) -> Result<Book>;
}
