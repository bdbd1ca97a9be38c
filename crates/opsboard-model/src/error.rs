use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

/// Structural ingestion failures.
///
/// Only whole-payload problems surface here. Individual rows that cannot be normalized are
/// skipped (and logged) by the `ingest` helpers.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset {dataset} must be a JSON array")]
    NotAnArray { dataset: String },

    #[error("dataset {dataset}: row {index} is not a JSON object")]
    NotAnObject { dataset: String, index: usize },
}
