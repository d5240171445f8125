//! Error types for the question library

use thiserror::Error;

/// Errors that can occur in the library store
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The backing file does not exist yet
    #[error("Library data not found at {path}")]
    MissingData { path: String },

    /// No entry carries the requested id
    #[error("Entry with ID {id} not found")]
    NotFound { id: u64 },

    /// The backing file exists but is not a library document
    #[error("Error reading library data: {0}")]
    Corrupt(String),

    /// Filesystem error
    #[error("Library I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LibraryError {
    /// True for both a missing store and a missing entry.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LibraryError::MissingData { .. } | LibraryError::NotFound { .. }
        )
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_covers_missing_store_and_entry() {
        assert!(LibraryError::NotFound { id: 7 }.is_not_found());
        assert!(LibraryError::MissingData {
            path: "x.json".into()
        }
        .is_not_found());
        assert!(!LibraryError::Corrupt("bad".into()).is_not_found());
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(
            LibraryError::NotFound { id: 42 }.to_string(),
            "Entry with ID 42 not found"
        );
    }
}
