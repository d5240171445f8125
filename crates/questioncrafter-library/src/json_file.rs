//! Library store backed by a single JSON file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::document::LibraryDocument;
use crate::entry::{LibraryEntry, NewComment, NewLibraryEntry};
use crate::error::{LibraryError, Result};
use crate::store::LibraryStore;

/// Whole-file read-modify-write store.
///
/// Every mutation rewrites the file through a temporary file in the same
/// directory followed by a rename, so readers never see a partial document.
#[derive(Debug, Clone)]
pub struct JsonFileLibrary {
    path: PathBuf,
}

impl JsonFileLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. `Ok(None)` when the file does not exist.
    fn read(&self) -> Result<Option<LibraryDocument>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| LibraryError::Corrupt(e.to_string()))
    }

    /// Read the document for an edit of an existing entry.
    fn read_existing(&self) -> Result<LibraryDocument> {
        match self.read() {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => {
                error!(path = %self.path.display(), "library file not found");
                Err(LibraryError::MissingData {
                    path: self.path.display().to_string(),
                })
            }
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "error parsing library file");
                Err(e)
            }
        }
    }

    fn write(&self, doc: &LibraryDocument) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, doc)?;
        tmp.write_all(b"\n")?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl LibraryStore for JsonFileLibrary {
    async fn submit(&self, entry: NewLibraryEntry) -> Result<u64> {
        info!(question = %entry.original_question, "submitting to library");
        let mut doc = match self.read() {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                info!(path = %self.path.display(), "creating new library file");
                LibraryDocument::default()
            }
            Err(LibraryError::Corrupt(reason)) => {
                warn!(
                    path = %self.path.display(),
                    reason = %reason,
                    "library file unreadable; starting a new document"
                );
                LibraryDocument::default()
            }
            Err(e) => return Err(e),
        };
        let id = doc.submit(entry, Utc::now());
        self.write(&doc)?;
        info!(id, "added entry to library");
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<LibraryEntry>> {
        match self.read() {
            Ok(Some(doc)) => {
                info!(entries = doc.entries.len(), "retrieved library entries");
                Ok(doc.entries)
            }
            Ok(None) => {
                warn!(path = %self.path.display(), "library file not found");
                Ok(Vec::new())
            }
            Err(LibraryError::Corrupt(reason)) => {
                error!(reason = %reason, "error parsing library file");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn get(&self, id: u64) -> Result<LibraryEntry> {
        let mut doc = self.read_existing()?;
        let entry = doc.view(id)?;
        if entry.best_answer.as_deref().map_or(true, str::is_empty) {
            warn!(id, "entry has no best answer");
        }
        self.write(&doc)?;
        Ok(entry)
    }

    async fn comment(&self, comment: NewComment) -> Result<u64> {
        let entry_id = comment.entry_id;
        let mut doc = self.read_existing()?;
        let id = doc.comment(comment, Utc::now())?;
        self.write(&doc)?;
        info!(entry_id, comment_id = id, "comment added");
        Ok(id)
    }

    async fn upvote(&self, id: u64) -> Result<LibraryEntry> {
        let mut doc = self.read_existing()?;
        let entry = doc.upvote(id)?;
        self.write(&doc)?;
        info!(id, votes = entry.votes, "entry upvoted");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_store() -> (tempfile::TempDir, JsonFileLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileLibrary::new(dir.path().join("library_entries.json"));
        (dir, store)
    }

    #[test]
    fn write_then_read() {
        let (_dir, store) = make_store();
        let mut doc = LibraryDocument::default();
        doc.submit(
            NewLibraryEntry::new("q", "r", vec!["Ada".into()]),
            Utc::now(),
        );
        store.write(&doc).unwrap();
        assert_eq!(store.read().unwrap(), Some(doc));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let (_dir, store) = make_store();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn garbage_is_corrupt() {
        let (_dir, store) = make_store();
        fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.read(), Err(LibraryError::Corrupt(_))));
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (dir, store) = make_store();
        store.write(&LibraryDocument::default()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }
}
