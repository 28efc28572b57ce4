//! Demo data
//!
//! Seeds two books and one member, then exercises a search and a user lookup
//! so the logs show the cache at work.

use tracing::info;

use crate::error::{LibraryError, Result};
use crate::library::Library;
use crate::models::{NewBook, NewUser};

pub fn demo_books() -> Vec<NewBook> {
    vec![
        NewBook::new("The Great Gatsby", "F. Scott Fitzgerald", 5, "9780743273565"),
        NewBook::new("To Kill a Mockingbird", "Harper Lee", 3, "9780446310789"),
    ]
}

pub fn demo_user() -> NewUser {
    NewUser::new("John Doe", "john@example.com", "ACTIVE")
}

/// Inserts the demo records. Records that already exist are skipped, so
/// seeding an existing database is harmless.
pub fn seed_demo(library: &Library) -> Result<()> {
    for book in demo_books() {
        skip_conflict(library.add_book(book))?;
    }
    skip_conflict(library.add_user(demo_user()))?;

    for book in library.search_books("Gatsby")? {
        info!(?book, "search 'Gatsby'");
    }
    if let Some(user) = library.find_user_by_email("john@example.com")? {
        info!(?user, "found user by email");
    }
    Ok(())
}

fn skip_conflict<T>(result: Result<T>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(LibraryError::Conflict(msg)) => {
            info!("demo record already present: {}", msg);
            Ok(())
        }
        Err(err) => Err(err),
    }
}
