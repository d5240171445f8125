//! Library records and submission payloads.

use questioncrafter_core::IndividualAnswer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_IMPACT: &str = "User-contributed transformation";
pub const DEFAULT_AUTHOR: &str = "Anonymous";
/// Name given to a bare answer when the entry lists no experts.
pub const FALLBACK_EXPERT: &str = "Expert";

/// Whether an entry was contributed by a user or promoted by curators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    User,
    Featured,
}

/// Audio companion metadata shown alongside an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Podcast {
    pub title: String,
    pub duration: String,
    pub summary: String,
}

impl Podcast {
    pub fn for_entry(category: &str, experts: &[String]) -> Self {
        Self {
            title: format!("The Transformation Journey: {category}"),
            duration: "00:00".to_string(),
            summary: format!(
                "A question was transformed using the following experts: {}. \
                 The refinement focuses on {} aspects.",
                experts.join(", "),
                category.to_lowercase()
            ),
        }
    }
}

/// A comment left on an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub entry_id: u64,
    pub comment: String,
    pub author: String,
    pub date: String,
}

/// A stored question transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: u64,
    pub original_question: String,
    pub refined_question: String,
    pub expert_personas: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub impact: String,
    pub author: String,
    pub individual_answers: Vec<IndividualAnswer>,
    pub best_answer: Option<String>,
    pub date: String,
    pub votes: u64,
    /// Number of items in `comment_list`.
    pub comments: u64,
    pub comment_list: Vec<Comment>,
    pub views: u64,
    pub status: EntryStatus,
    pub podcast: Podcast,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_impact() -> String {
    DEFAULT_IMPACT.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

/// Payload for submitting a new entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLibraryEntry {
    pub original_question: String,
    pub refined_question: String,
    pub expert_personas: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_impact")]
    pub impact: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub individual_answers: SubmittedAnswers,
    #[serde(default)]
    pub best_answer: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl NewLibraryEntry {
    pub fn new(
        original_question: impl Into<String>,
        refined_question: impl Into<String>,
        expert_personas: Vec<String>,
    ) -> Self {
        Self {
            original_question: original_question.into(),
            refined_question: refined_question.into(),
            expert_personas,
            category: default_category(),
            tags: Vec::new(),
            impact: default_impact(),
            author: default_author(),
            individual_answers: SubmittedAnswers::default(),
            best_answer: None,
            date: None,
        }
    }
}

/// Payload for commenting on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub entry_id: u64,
    pub comment: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub date: Option<String>,
}

impl NewComment {
    pub fn new(entry_id: u64, comment: impl Into<String>) -> Self {
        Self {
            entry_id,
            comment: comment.into(),
            author: default_author(),
            date: None,
        }
    }
}

/// Individual answers in any of the shapes clients send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswers {
    List(Vec<SubmittedAnswer>),
    /// Expert name to answer, in the order the client sent them.
    ByName(Map<String, Value>),
    /// A JSON-encoded list.
    Encoded(String),
}

impl Default for SubmittedAnswers {
    fn default() -> Self {
        SubmittedAnswers::List(Vec::new())
    }
}

/// One element of a submitted answer list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedAnswer {
    Named(IndividualAnswer),
    Text(String),
    Other(Value),
}

impl From<Vec<IndividualAnswer>> for SubmittedAnswers {
    fn from(answers: Vec<IndividualAnswer>) -> Self {
        SubmittedAnswers::List(answers.into_iter().map(SubmittedAnswer::Named).collect())
    }
}

impl SubmittedAnswers {
    /// Convert to `{name, answer}` pairs.
    ///
    /// Bare strings are attributed to the first expert, or to
    /// [`FALLBACK_EXPERT`] when there are none. Elements of any other shape
    /// are dropped.
    pub fn normalize(self, experts: &[String]) -> Vec<IndividualAnswer> {
        let items = match self {
            SubmittedAnswers::List(items) => items,
            SubmittedAnswers::ByName(map) => {
                return map
                    .into_iter()
                    .map(|(name, answer)| match answer {
                        Value::String(text) => IndividualAnswer::new(name, text),
                        other => IndividualAnswer::new(name, other.to_string()),
                    })
                    .collect()
            }
            SubmittedAnswers::Encoded(text) => match serde_json::from_str(&text) {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "could not decode individual answers string");
                    return Vec::new();
                }
            },
        };

        let first_expert = experts
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_EXPERT);
        items
            .into_iter()
            .filter_map(|item| match item {
                SubmittedAnswer::Named(answer) => Some(answer),
                SubmittedAnswer::Text(text) => Some(IndividualAnswer::new(first_expert, text)),
                SubmittedAnswer::Other(_) => None,
            })
            .collect()
    }
}
