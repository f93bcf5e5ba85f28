use thiserror::Error;

/// Failures surfaced by a document store adapter.
///
/// Steps are carried as plain strings here so the adapter layer stays
/// independent of the workflow vocabulary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("precondition failed: expected step {expected}, found {actual}")]
    Conflict { expected: String, actual: String },

    #[error("store backend failure: {0}")]
    Backend(String),
}
