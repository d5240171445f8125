//! Structured lifecycle events for selection and refinement requests.
//!
//! Every request runs inside a [`RequestSpan`], so the events below carry the
//! request id without threading it through each call site.

use tracing::{info, warn};
use uuid::Uuid;

/// Request-scoped span carrying a fresh request id.
///
/// Attach it to the request future with [`tracing::Instrument`]; entering it
/// across an `.await` would tag unrelated work.
pub struct RequestSpan {
    request_id: Uuid,
    span: tracing::Span,
}

impl RequestSpan {
    /// Create a span for one pipeline operation.
    pub fn new(operation: &'static str) -> Self {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("questioncrafter.request", %request_id, operation);
        Self { request_id, span }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn span(&self) -> tracing::Span {
        self.span.clone()
    }
}

/// Emit event: persona selection started.
pub fn emit_selection_started(question: &str, available: usize) {
    info!(
        event = "selection.started",
        question = %question,
        available_personas = available,
    );
}

/// Emit event: the rationale repair request was issued.
pub fn emit_repair_issued(missing: &[String]) {
    warn!(event = "selection.repair_issued", missing = ?missing);
}

/// Emit event: persona selection finished with the validated names.
pub fn emit_selection_finished(personas: &[String]) {
    info!(event = "selection.finished", personas = ?personas);
}

/// Emit event: a refinement stage returned.
pub fn emit_stage_completed(stage: u8, name: &str, reply_chars: usize) {
    info!(
        event = "refinement.stage_completed",
        stage = stage,
        name = %name,
        reply_chars = reply_chars,
    );
}

/// Emit event: an individual answer fell back to the placeholder.
pub fn emit_answer_fallback(persona: &str) {
    warn!(event = "extraction.fallback", persona = %persona);
}

/// Emit event: refinement finished.
pub fn emit_refinement_finished(turns: usize, answers: usize) {
    info!(
        event = "refinement.finished",
        turns = turns,
        individual_answers = answers,
    );
}
