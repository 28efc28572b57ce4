//! Book records

use serde::{Deserialize, Serialize};

/// A catalogued book. The ISBN is its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub copies_available: i64,
    pub isbn: String,
}

/// A book not yet stored, so without a row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub copies_available: i64,
    pub isbn: String,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        copies_available: i64,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            copies_available,
            isbn: isbn.into(),
        }
    }

    /// Validates the book data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        if self.author.trim().is_empty() {
            return Some("Author cannot be empty".to_string());
        }
        if self.copies_available < 0 {
            return Some("Copies available cannot be negative".to_string());
        }
        if self.isbn.is_empty() || self.isbn.len() > 13 {
            return Some("ISBN must be 1 to 13 characters".to_string());
        }
        None
    }

    /// Attaches the row id assigned by the store.
    pub fn with_id(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            copies_available: self.copies_available,
            isbn: self.isbn,
        }
    }
}
