//! Error taxonomy for the selection and refinement pipeline.

use crate::model::ModelError;

/// Errors produced while loading the persona catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read persona catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid persona catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("persona catalog entry has a non-string key")]
    NonStringKey,
}

/// Hard failures surfaced by `select_personas` and `refine_question`.
///
/// Answer extraction never fails; it degrades to placeholders instead.
#[derive(Debug, thiserror::Error)]
pub enum CrafterError {
    #[error("could not parse persona selection output: {reason}")]
    SchemaParse { reason: String },

    #[error("expected key {field} not found in persona selection output")]
    MissingField { field: String },

    #[error("error generating complete rationales: {reason}")]
    RepairFailure { reason: String },

    #[error("language model call failed: {0}")]
    Upstream(#[from] ModelError),

    #[error("persona catalog is empty; cannot substitute invalid persona {candidate}")]
    EmptyCatalog { candidate: String },

    #[error("personas data is missing from the request")]
    NoPersonas,

    #[error("refinement produced no improvement over the original question")]
    UnchangedQuestion,

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, CrafterError>;
