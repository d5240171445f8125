//! Declared output schemas for structured model requests.
//!
//! A schema renders format instructions for the prompt and coerces whatever
//! the model sent back into a JSON object. Field presence is checked by the
//! caller so it can name the missing key.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{CrafterError, Result};
use crate::model::{extract_json_object, ModelReply};

/// Keys under which a provider may hand back the reply un-interpreted.
const PAYLOAD_KEYS: [&str; 3] = ["text", "output", "response"];

/// One named field the reply is expected to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseField {
    pub name: &'static str,
    pub description: &'static str,
}

impl ResponseField {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

/// Ordered set of fields plus optional extra guidance appended to the
/// format instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    fields: Vec<ResponseField>,
    note: Option<&'static str>,
}

impl OutputSchema {
    pub fn new(fields: impl IntoIterator<Item = ResponseField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    pub fn fields(&self) -> &[ResponseField] {
        &self.fields
    }

    /// Instructions embedded in the prompt describing the expected JSON.
    pub fn format_instructions(&self) -> String {
        let body = self
            .fields
            .iter()
            .map(|f| format!("\t\"{}\": string  // {}", f.name, f.description))
            .collect::<Vec<_>>()
            .join("\n");

        let mut out = format!(
            "The output should be a JSON object formatted in the following schema:\n\n\
             ```json\n{{\n{body}\n}}\n```"
        );
        if let Some(note) = self.note {
            out.push('\n');
            out.push_str(note);
        }
        out
    }

    /// Coerce a reply into a JSON object.
    ///
    /// Any object the reply carries, bare or fenced, is used as it is. A
    /// mapping whose only content is a string under a generic payload key is
    /// unwrapped and parsed again.
    pub fn coerce(&self, reply: ModelReply) -> Result<Map<String, Value>> {
        let map = match reply.to_object() {
            Some(map) => map,
            None => self.parse(&reply.into_text())?,
        };
        self.unwrap_payload(map)
    }

    /// Parse raw reply text into a JSON object.
    pub fn parse(&self, text: &str) -> Result<Map<String, Value>> {
        extract_json_object(text).ok_or_else(|| CrafterError::SchemaParse {
            reason: format!("no JSON object found in reply: {}", preview(text)),
        })
    }

    fn unwrap_payload(&self, map: Map<String, Value>) -> Result<Map<String, Value>> {
        if self.fields.iter().any(|f| map.contains_key(f.name)) {
            return Ok(map);
        }
        let payload = PAYLOAD_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str));
        match payload {
            Some(inner) => {
                debug!("unwrapping schema payload carried as a string");
                self.parse(inner)
            }
            None => Ok(map),
        }
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 120;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
