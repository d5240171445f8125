//! Multi-stage refinement of a question by three personas.
//!
//! - [`conversation`]: append-only turn log
//! - [`stages`]: the eleven stages and their prompts
//! - [`engine`]: `refine_question`

pub mod conversation;
pub mod engine;
pub mod stages;

pub use conversation::Conversation;
pub use engine::{refine_question, RefinementOutcome};
pub use stages::Stage;
