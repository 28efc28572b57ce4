//! SQLite Store
//!
//! `LibraryStore` over a single rusqlite connection guarded by a mutex.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{LibraryError, Result};
use crate::models::{Book, NewBook, NewUser, User};
use crate::store::LibraryStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL,
    membership_status TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    copies_available INTEGER NOT NULL,
    isbn TEXT UNIQUE NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_books_title_author ON books(title, author);

CREATE TABLE IF NOT EXISTS loans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id),
    book_id INTEGER NOT NULL REFERENCES books(id),
    loan_date TEXT NOT NULL,
    return_date TEXT
);
";

const BOOK_COLUMNS: &str = "id, title, author, copies_available, isbn";
const USER_COLUMNS: &str = "id, name, email, membership_status";

/// SQLite-backed library store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database named in `config` and ensures
    /// the tables exist. `:memory:` opens a private in-memory database.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let conn = if config.database_path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(Path::new(&config.database_path))?
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;

        let store = Self::from_connection(conn)?;
        info!(path = %config.database_path, "database opened");
        Ok(store)
    }

    /// Opens a fresh in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        register_casefold(&conn)?;
        conn.execute_batch(SCHEMA)?;
        debug!("database tables initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl LibraryStore for SqliteStore {
    fn insert_book(&self, book: &NewBook) -> Result<Book> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO books (title, author, copies_available, isbn) VALUES (?1, ?2, ?3, ?4)",
            params![book.title, book.author, book.copies_available, book.isbn],
        )
        .map_err(|e| unique_violation(e, || format!("book with ISBN {} already exists", book.isbn)))?;

        Ok(book.clone().with_id(conn.last_insert_rowid()))
    }

    fn search_books(&self, pattern: &str) -> Result<Vec<Book>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE casefold(title) LIKE ?1 ESCAPE '\\' \
                OR casefold(author) LIKE ?1 ESCAPE '\\' \
             ORDER BY id"
        ))?;

        let books = stmt
            .query_map(params![like_pattern(&pattern.to_lowercase())], book_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    fn find_book_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let conn = self.conn.lock();
        let book = conn
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1"),
                params![isbn],
                book_from_row,
            )
            .optional()?;
        Ok(book)
    }

    fn insert_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (name, email, membership_status) VALUES (?1, ?2, ?3)",
            params![user.name, user.email, user.membership_status],
        )
        .map_err(|e| unique_violation(e, || format!("user with email {} already exists", user.email)))?;

        Ok(user.clone().with_id(conn.last_insert_rowid()))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn borrow_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let mut conn = self.conn.lock();
        // Dropping the transaction without commit rolls it back
        let tx = conn.transaction()?;

        let user_exists = tx
            .query_row("SELECT 1 FROM users WHERE id = ?1", params![user_id], |_| Ok(()))
            .optional()?
            .is_some();
        if !user_exists {
            return Err(LibraryError::NotFound(format!("user {}", user_id)));
        }

        let book = tx
            .query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
                params![book_id],
                book_from_row,
            )
            .optional()?;
        let book = match book {
            Some(book) if book.copies_available > 0 => book,
            _ => return Err(LibraryError::NotAvailable(book_id)),
        };

        tx.execute(
            "UPDATE books SET copies_available = copies_available - 1 WHERE id = ?1",
            params![book_id],
        )?;
        tx.execute(
            "INSERT INTO loans (user_id, book_id, loan_date) VALUES (?1, ?2, ?3)",
            params![user_id, book_id, chrono::Utc::now().to_rfc3339()],
        )?;
        tx.commit()?;

        Ok(Book {
            copies_available: book.copies_available - 1,
            ..book
        })
    }

    fn return_book(&self, user_id: i64, book_id: i64) -> Result<Book> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let closed = tx.execute(
            "UPDATE loans SET return_date = ?3 WHERE id = (
                SELECT id FROM loans
                WHERE user_id = ?1 AND book_id = ?2 AND return_date IS NULL
                ORDER BY id LIMIT 1
            )",
            params![user_id, book_id, chrono::Utc::now().to_rfc3339()],
        )?;
        if closed == 0 {
            return Err(LibraryError::NoActiveLoan { user_id, book_id });
        }

        tx.execute(
            "UPDATE books SET copies_available = copies_available + 1 WHERE id = ?1",
            params![book_id],
        )?;
        let book = tx.query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
            params![book_id],
            book_from_row,
        )?;
        tx.commit()?;

        Ok(book)
    }
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        copies_available: row.get(3)?,
        isbn: row.get(4)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        membership_status: row.get(3)?,
    })
}

/// Registers `casefold(text)`, a Unicode-aware lower-casing function.
///
/// SQLite's own `lower` and `LIKE` only fold ASCII letters.
fn register_casefold(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "casefold",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: String = ctx.get(0)?;
            Ok(text.to_lowercase())
        },
    )
}

/// Wraps `pattern` for a substring LIKE match, escaping LIKE wildcards.
fn like_pattern(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len() + 2);
    escaped.push('%');
    for c in pattern.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Maps a UNIQUE constraint failure to `Conflict`; other errors pass through.
fn unique_violation(err: rusqlite::Error, message: impl FnOnce() -> String) -> LibraryError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            LibraryError::Conflict(message())
        }
        _ => LibraryError::Database(err),
    }
}
