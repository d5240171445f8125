//! QuestionCrafter Library: shared store of refined questions
//!
//! Users submit finished transformations; others browse, comment and upvote.
//!
//! ## Key Components
//!
//! - `LibraryStore`: async storage trait
//! - `JsonFileLibrary`: whole-file JSON store with atomic rewrites
//! - `MemoryLibrary`: in-memory fake for tests
//! - `LibraryDocument`: the edits shared by every store

pub mod document;
pub mod entry;
mod error;
pub mod fakes;
pub mod json_file;
pub mod store;

pub use document::LibraryDocument;
pub use entry::{
    Comment, EntryStatus, LibraryEntry, NewComment, NewLibraryEntry, Podcast, SubmittedAnswer,
    SubmittedAnswers, DEFAULT_AUTHOR, DEFAULT_CATEGORY, DEFAULT_IMPACT, FALLBACK_EXPERT,
};
pub use error::{LibraryError, Result};
pub use fakes::MemoryLibrary;
pub use json_file::JsonFileLibrary;
pub use store::LibraryStore;
