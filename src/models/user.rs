//! User records

use serde::{Deserialize, Serialize};

/// A library member. The email is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub membership_status: String,
}

/// A user not yet stored, so without a row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub membership_status: String,
}

impl NewUser {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        membership_status: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            membership_status: membership_status.into(),
        }
    }

    /// Validates the user data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if !self.email.contains('@') {
            return Some("Email must contain '@'".to_string());
        }
        if self.membership_status.trim().is_empty() {
            return Some("Membership status cannot be empty".to_string());
        }
        None
    }

    /// Attaches the row id assigned by the store.
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            membership_status: self.membership_status,
        }
    }
}
