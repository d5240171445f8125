//! Structured persona selection with rationale repair.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{CrafterError, Result};
use crate::metrics::METRICS;
use crate::model::{ChatModel, CompletionRequest};
use crate::obs;
use crate::persona::{validate_selection, PersonaCatalog, PersonaDefinition};
use crate::schema::{OutputSchema, ResponseField};

/// Number of personas chosen per question.
pub const PERSONA_SLOTS: [&str; 3] = ["persona1", "persona2", "persona3"];

const RATIONALE_FIELD: &str = "rationale";

/// Three personas chosen for a question, each with a rationale keyed by its
/// catalog key.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSelection {
    pub personas: Vec<Arc<PersonaDefinition>>,
    pub rationales: BTreeMap<String, String>,
}

impl PersonaSelection {
    pub fn rationale_for(&self, persona: &PersonaDefinition) -> Option<&str> {
        self.rationales
            .get(&persona.original_role)
            .map(String::as_str)
    }

    /// Flatten into the records handed to the refinement stage.
    pub fn to_records(&self) -> Vec<SelectedPersona> {
        self.personas
            .iter()
            .map(|persona| SelectedPersona {
                definition: PersonaDefinition::clone(persona),
                rationale: self.rationale_for(persona).unwrap_or_default().to_string(),
            })
            .collect()
    }
}

/// A persona definition together with why it was selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPersona {
    #[serde(flatten)]
    pub definition: PersonaDefinition,
    #[serde(default)]
    pub rationale: String,
}

impl SelectedPersona {
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Profile text used to introduce the persona in the first refinement
    /// stage.
    pub fn describe(&self) -> String {
        format!(
            "{}\nRationale for Selection: {}",
            self.definition.describe(),
            self.rationale
        )
    }
}

fn selection_schema() -> OutputSchema {
    OutputSchema::new([
        ResponseField::new("persona1", "the first selected persona name"),
        ResponseField::new("persona2", "the second selected persona name"),
        ResponseField::new("persona3", "the third selected persona name"),
        ResponseField::new(
            RATIONALE_FIELD,
            "an object whose keys are the selected persona names and whose values \
             explain why each persona was selected",
        ),
    ])
    .with_note(
        "The 'rationale' field must be an object with one key for each selected persona \
         and the reason for choosing it as the value.",
    )
}

fn selection_prompt(question: &str, personas: &str, format_instructions: &str) -> String {
    format!(
        "Study the following question closely and consider what it is really asking.\n\n\
         Question: {question}\n\n\
         Choose 3 expert personas from the list below whose knowledge would combine to \
         explore this question from complementary angles. Think about what each one \
         brings and how their views might interact to surface unexpected insights.\n\n\
         Available Personas: {personas}\n\n\
         Requirements:\n\
         - Choose exactly 3 personas, and only names that appear in the list above\n\
         - Do not choose the same persona twice\n\
         - Give a clear rationale for each choice in relation to the question\n\
         - Put the rationales in a 'rationale' object keyed by persona name\n\
         - Reply with valid JSON only: no markdown, no code fences, no extra text\n\
         - A missing rationale for any chosen persona is an error\n\n\
         {format_instructions}"
    )
}

fn repair_prompt(question: &str, missing: &[String]) -> String {
    format!(
        "For the following question: {question}\n\n\
         Give a clear and specific rationale for selecting each of these personas to \
         explore the question: {}\n\n\
         Reply with a JSON object where each key is a persona name and each value is \
         the rationale.",
        missing.join(", ")
    )
}

/// Choose three personas for `question` and make sure each one carries a
/// rationale.
///
/// Unknown names returned by the model are swapped for random catalog members.
/// Missing rationales are requested once more; if that reply is not usable the
/// selection fails.
pub async fn select_personas<R: Rng + Send + ?Sized>(
    model: &dyn ChatModel,
    catalog: &PersonaCatalog,
    question: &str,
    rng: &mut R,
) -> Result<PersonaSelection> {
    obs::emit_selection_started(question, catalog.len());

    let schema = selection_schema();
    let prompt = selection_prompt(
        question,
        &catalog.names().join(", "),
        &schema.format_instructions(),
    );
    debug!(prompt = %prompt, "persona selection prompt");

    let reply = model
        .complete(CompletionRequest::prompt(prompt).expecting_json())
        .await?;
    let parsed = schema.coerce(reply)?;

    let candidates = PERSONA_SLOTS
        .iter()
        .map(|slot| match parsed.get(*slot) {
            Some(Value::String(name)) => Ok(name.clone()),
            _ => Err(CrafterError::MissingField {
                field: slot.to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    let validated = validate_selection(catalog, &candidates, rng)?;
    info!(personas = ?validated, "validated selected personas");

    let personas: Vec<_> = validated
        .iter()
        .map(|name| catalog.get_or_stub(name))
        .collect();

    let mut rationales = read_rationales(parsed.get(RATIONALE_FIELD));
    let missing = missing_rationales(&validated, &rationales);
    if !missing.is_empty() {
        obs::emit_repair_issued(&missing);
        METRICS.inc_repair_requests();

        let reply = model
            .complete(CompletionRequest::prompt(repair_prompt(question, &missing)).expecting_json())
            .await?;
        let repaired = reply.to_object().ok_or_else(|| CrafterError::RepairFailure {
            reason: "repair reply is not a JSON object".to_string(),
        })?;
        merge_rationales(&mut rationales, &repaired);

        let still_missing = missing_rationales(&validated, &rationales);
        if !still_missing.is_empty() {
            return Err(CrafterError::RepairFailure {
                reason: format!("no rationale for {}", still_missing.join(", ")),
            });
        }
    }

    obs::emit_selection_finished(&validated);
    Ok(PersonaSelection {
        personas,
        rationales,
    })
}

/// Keep only non-empty string rationales; anything that is not an object
/// yields nothing.
fn read_rationales(value: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(map)) = value else {
        if value.is_some() {
            tracing::warn!("rationale is not an object; treating every rationale as missing");
        }
        return BTreeMap::new();
    };
    let mut out = BTreeMap::new();
    merge_rationales(&mut out, map);
    out
}

/// Add rationales that are not already present.
fn merge_rationales(into: &mut BTreeMap<String, String>, from: &Map<String, Value>) {
    for (name, value) in from {
        if let Some(text) = value.as_str().map(str::trim).filter(|t| !t.is_empty()) {
            into.entry(name.clone()).or_insert_with(|| text.to_string());
        }
    }
}

fn missing_rationales(personas: &[String], rationales: &BTreeMap<String, String>) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for name in personas {
        if !rationales.contains_key(name) && !missing.contains(name) {
            missing.push(name.clone());
        }
    }
    missing
}
