use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaxaError {
    #[error("taxon id {0:?} appears more than once in the tree")]
    DuplicateId(String),

    #[error("invalid colour value {0:?}")]
    InvalidColour(String),

    #[error("tree document contains no root taxon")]
    EmptyDocument,

    #[error("invalid tree JSON: {0}")]
    Json(#[from] serde_json::Error),
}
