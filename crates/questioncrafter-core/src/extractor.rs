//! Per-persona answer extraction from free text.
//!
//! Two patterns are tried for each persona, strict first. When neither finds
//! a non-empty answer the persona gets [`PLACEHOLDER_ANSWER`]. Extraction
//! never fails.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::metrics::METRICS;
use crate::obs;

pub const PLACEHOLDER_ANSWER: &str =
    "This expert contributed their perspective to the final refinement.";

/// One persona's final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualAnswer {
    pub name: String,
    pub answer: String,
}

impl IndividualAnswer {
    pub fn new(name: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            answer: answer.into(),
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, PLACEHOLDER_ANSWER)
    }

    pub fn is_placeholder(&self) -> bool {
        self.answer == PLACEHOLDER_ANSWER
    }
}

struct Matcher {
    strict: Regex,
    lenient: Regex,
}

impl Matcher {
    fn for_name(name: &str) -> Result<Self, regex::Error> {
        let name = regex::escape(name);
        Ok(Self {
            // `Name ...: answer` up to the next blank-line-prefixed label.
            strict: Regex::new(&format!(r"(?is){name}(?:.*?):(.*?)(?:(?:\n\n.*?:)|$)"))?,
            // Name line, then the paragraph below it.
            lenient: Regex::new(&format!(r"(?s){name}[^\n]*\n(.*?)(?:\n\n|\n[A-Z]|\z)"))?,
        })
    }

    fn find(&self, text: &str) -> Option<String> {
        [&self.strict, &self.lenient].into_iter().find_map(|re| {
            re.captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim())
                .filter(|answer| !answer.is_empty())
                .map(str::to_string)
        })
    }
}

/// Pull one answer per persona out of `text`, in persona order.
pub fn extract_individual_answers<S: AsRef<str>>(text: &str, names: &[S]) -> Vec<IndividualAnswer> {
    let matchers = names
        .iter()
        .map(|name| match name.as_ref() {
            "" => Ok(None),
            name => Matcher::for_name(name).map(Some),
        })
        .collect::<Result<Vec<_>, _>>();

    let matchers = match matchers {
        Ok(matchers) => matchers,
        Err(e) => {
            warn!(error = %e, "could not build answer patterns; using placeholders");
            return names.iter().map(|name| fallback(name.as_ref())).collect();
        }
    };

    names
        .iter()
        .zip(matchers)
        .map(|(name, matcher)| {
            let name = name.as_ref();
            match matcher.and_then(|m| m.find(text)) {
                Some(answer) => {
                    debug!(persona = %name, chars = answer.len(), "extracted individual answer");
                    IndividualAnswer::new(name, answer)
                }
                None => fallback(name),
            }
        })
        .collect()
}

fn fallback(name: &str) -> IndividualAnswer {
    obs::emit_answer_fallback(name);
    METRICS.inc_answer_fallbacks();
    IndividualAnswer::placeholder(name)
}
