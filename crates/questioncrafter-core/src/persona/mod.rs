//! Persona catalog and selection validation.
//!
//! - [`catalog`]: `PersonaDefinition`, `PersonaCatalog`
//! - [`validator`]: `validate_selection`

pub mod catalog;
pub mod validator;

pub use catalog::{PersonaCatalog, PersonaDefinition, UNKNOWN_BACKGROUND, UNKNOWN_ROLE};
pub use validator::validate_selection;
