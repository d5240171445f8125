//! QuestionCrafter Core Library
//!
//! Turns a user's question into a sharper one by choosing three expert
//! personas and running them through a fixed eleven-stage dialogue with a
//! language model.
//!
//! ## Key Components
//!
//! - `PersonaCatalog`: read-only persona definitions loaded at startup
//! - `select_personas`: structured selection with rationale repair
//! - `refine_question`: the refinement conversation
//! - `extract_individual_answers`: per-persona answers with a placeholder fallback
//! - `ChatModel`: the model seam, with `OpenAiChatModel` and `fakes::ScriptedModel`

pub mod error;
pub mod extractor;
pub mod fakes;
pub mod metrics;
pub mod model;
pub mod obs;
pub mod persona;
pub mod refinement;
pub mod schema;
pub mod selection;
pub mod telemetry;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::Instrument;

pub use error::{CatalogError, CrafterError, Result};
pub use extractor::{extract_individual_answers, IndividualAnswer, PLACEHOLDER_ANSWER};
pub use model::{
    ChatModel, CompletionRequest, ModelConfig, ModelError, ModelReply, OpenAiChatModel, Turn,
    TurnRole,
};
pub use persona::{
    validate_selection, PersonaCatalog, PersonaDefinition, UNKNOWN_BACKGROUND, UNKNOWN_ROLE,
};
pub use refinement::{refine_question, Conversation, RefinementOutcome, Stage};
pub use selection::{select_personas, PersonaSelection, SelectedPersona};

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A model and a persona catalog bundled for repeated requests.
#[derive(Clone)]
pub struct QuestionCrafter {
    model: Arc<dyn ChatModel>,
    catalog: Arc<PersonaCatalog>,
}

impl QuestionCrafter {
    pub fn new(model: Arc<dyn ChatModel>, catalog: Arc<PersonaCatalog>) -> Self {
        Self { model, catalog }
    }

    pub fn catalog(&self) -> &PersonaCatalog {
        &self.catalog
    }

    /// Choose three personas for `question`.
    pub async fn select_personas(&self, question: &str) -> Result<PersonaSelection> {
        let request = obs::RequestSpan::new("select_personas");
        let mut rng = StdRng::from_entropy();
        selection::select_personas(self.model.as_ref(), &self.catalog, question, &mut rng)
            .instrument(request.span())
            .await
    }

    /// Run the refinement dialogue for `question` with the given personas.
    pub async fn refine_question(
        &self,
        question: &str,
        personas: &[SelectedPersona],
    ) -> Result<RefinementOutcome> {
        let request = obs::RequestSpan::new("refine_question");
        refinement::refine_question(self.model.as_ref(), question, personas)
            .instrument(request.span())
            .await
    }
}
