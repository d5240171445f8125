//! In-memory fake for `LibraryStore` (testing only)

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::document::LibraryDocument;
use crate::entry::{LibraryEntry, NewComment, NewLibraryEntry};
use crate::error::Result;
use crate::store::LibraryStore;

/// Library store that keeps the document in memory.
#[derive(Debug, Default)]
pub struct MemoryLibrary {
    doc: Mutex<LibraryDocument>,
}

impl MemoryLibrary {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibrary {
    async fn submit(&self, entry: NewLibraryEntry) -> Result<u64> {
        let mut doc = self.doc.lock().unwrap();
        Ok(doc.submit(entry, Utc::now()))
    }

    async fn list(&self) -> Result<Vec<LibraryEntry>> {
        Ok(self.doc.lock().unwrap().entries.clone())
    }

    async fn get(&self, id: u64) -> Result<LibraryEntry> {
        self.doc.lock().unwrap().view(id)
    }

    async fn comment(&self, comment: NewComment) -> Result<u64> {
        self.doc.lock().unwrap().comment(comment, Utc::now())
    }

    async fn upvote(&self, id: u64) -> Result<LibraryEntry> {
        self.doc.lock().unwrap().upvote(id)
    }
}
