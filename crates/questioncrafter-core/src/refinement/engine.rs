//! Runs the eleven-stage refinement dialogue.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::conversation::Conversation;
use super::stages::Stage;
use crate::error::{CrafterError, Result};
use crate::extractor::{extract_individual_answers, IndividualAnswer};
use crate::metrics::METRICS;
use crate::model::{ChatModel, Turn};
use crate::obs;
use crate::selection::SelectedPersona;

/// Everything a refinement produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementOutcome {
    pub improved_question: String,
    pub final_answer: String,
    pub summary: String,
    pub rationale: String,
    pub harmony_principle: String,
    pub new_dimensions: String,
    pub individual_answers: Vec<IndividualAnswer>,
}

/// Send one stage prompt on top of the conversation so far.
async fn run_stage(
    model: &dyn ChatModel,
    conversation: Conversation,
    stage: Stage,
    prompt: String,
) -> Result<(Conversation, String)> {
    let conversation = conversation.with_turn(Turn::user(prompt));
    let reply = model.complete(conversation.to_request()).await?;
    let text = reply.into_text();
    obs::emit_stage_completed(stage.number(), stage.name(), text.chars().count());
    Ok((conversation.with_turn(Turn::assistant(text.clone())), text))
}

fn normalized(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Refine `question` through the eleven stages using the given personas.
///
/// Any model failure aborts the refinement. Individual answers are extracted
/// from the fifth stage and never fail.
pub async fn refine_question(
    model: &dyn ChatModel,
    question: &str,
    personas: &[SelectedPersona],
) -> Result<RefinementOutcome> {
    if personas.is_empty() {
        return Err(CrafterError::NoPersonas);
    }
    info!(question = %question, personas = personas.len(), "improving question");

    let persona_info = personas
        .iter()
        .map(SelectedPersona::describe)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut conversation = Conversation::new();
    let mut replies: [String; 11] = Default::default();
    for stage in Stage::ALL {
        let prompt = stage.prompt(question, &persona_info);
        let (next, text) = run_stage(model, conversation, stage, prompt).await?;
        conversation = next;
        replies[usize::from(stage.number()) - 1] = text;
    }

    let [
        _brainstorm,
        _critique,
        _revision,
        _expansion,
        individual,
        final_answer,
        improved_question,
        summary,
        rationale,
        harmony_principle,
        new_dimensions,
    ] = replies;
    let improved_question = improved_question.trim().to_string();

    if improved_question.is_empty() || normalized(&improved_question) == normalized(question) {
        return Err(CrafterError::UnchangedQuestion);
    }

    let names: Vec<&str> = personas.iter().map(SelectedPersona::name).collect();
    let individual_answers = extract_individual_answers(&individual, &names);

    obs::emit_refinement_finished(conversation.len(), individual_answers.len());
    METRICS.inc_refinements_completed();

    Ok(RefinementOutcome {
        improved_question,
        final_answer,
        summary,
        rationale,
        harmony_principle,
        new_dimensions,
        individual_answers,
    })
}
