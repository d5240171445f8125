//! Storage trait for the question library.

use async_trait::async_trait;

use crate::entry::{LibraryEntry, NewComment, NewLibraryEntry};
use crate::error::Result;

/// Keyed storage for submitted question transformations.
///
/// Implementations do not coordinate concurrent writers; the last write wins.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Store a new entry and return its id.
    async fn submit(&self, entry: NewLibraryEntry) -> Result<u64>;

    /// All entries in submission order. A missing or unreadable store is
    /// treated as empty.
    async fn list(&self) -> Result<Vec<LibraryEntry>>;

    /// Fetch one entry, counting the view.
    async fn get(&self, id: u64) -> Result<LibraryEntry>;

    /// Attach a comment and return the comment id.
    async fn comment(&self, comment: NewComment) -> Result<u64>;

    /// Count an upvote (and a view) and return the updated entry.
    async fn upvote(&self, id: u64) -> Result<LibraryEntry>;
}
