//! Normalization of model reply shapes.
//!
//! Models answer with plain prose, a JSON object, or JSON wrapped in a
//! markdown code fence. [`ModelReply::classify`] tags the raw text once and
//! [`ModelReply::into_text`] is the single resolver the conversation engine
//! uses to turn any shape back into text.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

/// Keys a keyed payload may carry its text under, in lookup order.
const TEXT_KEYS: [&str; 2] = ["response", "output"];

/// The shapes a model reply can take.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    PlainText(String),
    /// A bare JSON object; `raw` is the text exactly as received.
    KeyedPayload { raw: String, map: Map<String, Value> },
    FencedJson { raw: String, body: String },
}

impl ModelReply {
    /// Tag raw reply text with its shape.
    pub fn classify(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.starts_with("```") {
            let body = strip_code_fences(trimmed);
            return ModelReply::FencedJson { raw, body };
        }

        if trimmed.starts_with('{') {
            if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
                return ModelReply::KeyedPayload { raw, map };
            }
        }

        ModelReply::PlainText(raw)
    }

    /// Resolve any reply shape to plain text.
    ///
    /// Objects, bare or fenced, yield their `response` or `output` entry.
    /// Anything else comes back as the text the model sent.
    pub fn into_text(self) -> String {
        match self {
            ModelReply::PlainText(text) => text,
            ModelReply::KeyedPayload { raw, map } => text_entry(&map).unwrap_or(raw),
            ModelReply::FencedJson { raw, body } => match serde_json::from_str::<Value>(&body) {
                Ok(Value::Object(map)) => text_entry(&map).unwrap_or(raw),
                _ => raw,
            },
        }
    }

    /// Best-effort JSON object view of the reply.
    pub fn to_object(&self) -> Option<Map<String, Value>> {
        match self {
            ModelReply::KeyedPayload { map, .. } => Some(map.clone()),
            ModelReply::FencedJson { body, .. } => extract_json_object(body),
            ModelReply::PlainText(text) => extract_json_object(text),
        }
    }
}

fn text_entry(map: &Map<String, Value>) -> Option<String> {
    TEXT_KEYS.iter().find_map(|key| match map.get(*key)? {
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    })
}

fn fenced_block() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n?(.*?)```").ok())
        .as_ref()
}

/// Remove markdown code-fence markers (with or without a language tag).
///
/// The first complete fenced block anywhere in the text wins. An unterminated
/// opening fence or a stray closing fence is stripped as well.
pub fn strip_code_fences(text: &str) -> String {
    if let Some(inner) = fenced_block()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
    {
        return inner.as_str().trim().to_string();
    }

    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
            .unwrap_or(rest.len());
        body = &rest[tag_len..];
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }
    body.trim().to_string()
}

/// Find a JSON object in free text: as-is, inside a code fence, or between the
/// first `{` and the last `}`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    fn parse(candidate: &str) -> Option<Map<String, Value>> {
        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    if let Some(map) = parse(text) {
        return Some(map);
    }

    let stripped = strip_code_fences(text);
    if let Some(map) = parse(&stripped) {
        return Some(map);
    }

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }
    parse(&stripped[start..=end])
}
