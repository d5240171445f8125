//! The library document and the edits every store applies to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::{Comment, EntryStatus, LibraryEntry, NewComment, NewLibraryEntry, Podcast};
use crate::error::{LibraryError, Result};

/// Top-level shape of the library file: `{"entries": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub entries: Vec<LibraryEntry>,
}

impl LibraryDocument {
    /// Append a new entry and return its id.
    ///
    /// Ids are unix seconds, moved past the largest existing id so that two
    /// submissions within the same second stay distinct.
    pub fn submit(&mut self, new: NewLibraryEntry, now: DateTime<Utc>) -> u64 {
        let id = next_id(
            unix_seconds(now),
            self.entries.iter().map(|entry| entry.id),
        );
        let individual_answers = new.individual_answers.normalize(&new.expert_personas);
        let podcast = Podcast::for_entry(&new.category, &new.expert_personas);

        self.entries.push(LibraryEntry {
            id,
            original_question: new.original_question,
            refined_question: new.refined_question,
            expert_personas: new.expert_personas,
            category: new.category,
            tags: new.tags,
            impact: new.impact,
            author: new.author,
            individual_answers,
            best_answer: new.best_answer.filter(|answer| !answer.is_empty()),
            date: new.date.unwrap_or_else(|| now.to_rfc3339()),
            votes: 0,
            comments: 0,
            comment_list: Vec::new(),
            views: 0,
            status: EntryStatus::User,
            podcast,
        });
        id
    }

    pub fn find(&self, id: u64) -> Option<&LibraryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut LibraryEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(LibraryError::NotFound { id })
    }

    /// Count a view and return the entry.
    pub fn view(&mut self, id: u64) -> Result<LibraryEntry> {
        let entry = self.find_mut(id)?;
        entry.views += 1;
        Ok(entry.clone())
    }

    /// Count a vote. Voting also counts as a view.
    pub fn upvote(&mut self, id: u64) -> Result<LibraryEntry> {
        let entry = self.find_mut(id)?;
        entry.votes += 1;
        entry.views += 1;
        Ok(entry.clone())
    }

    /// Attach a comment and return its id (unix milliseconds, kept unique
    /// across every entry in the document).
    pub fn comment(&mut self, new: NewComment, now: DateTime<Utc>) -> Result<u64> {
        let id = next_id(
            unix_millis(now),
            self.entries
                .iter()
                .flat_map(|entry| entry.comment_list.iter().map(|comment| comment.id)),
        );
        let entry = self.find_mut(new.entry_id)?;
        entry.comment_list.push(Comment {
            id,
            entry_id: new.entry_id,
            comment: new.comment,
            author: new.author,
            date: new.date.unwrap_or_else(|| now.to_rfc3339()),
        });
        entry.comments = entry.comment_list.len() as u64;
        Ok(id)
    }
}

fn next_id(candidate: u64, existing: impl Iterator<Item = u64>) -> u64 {
    match existing.max() {
        Some(max) if max >= candidate => max + 1,
        _ => candidate,
    }
}

fn unix_seconds(now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp()).unwrap_or_default()
}

fn unix_millis(now: DateTime<Utc>) -> u64 {
    u64::try_from(now.timestamp_millis()).unwrap_or_default()
}
