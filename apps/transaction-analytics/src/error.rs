use thiserror::Error;

/// Errors raised while generating, summarizing or filtering a transaction table.
#[derive(Error, Debug)]
pub enum Error {
    /// A caller-supplied parameter is out of range (e.g. a zero row count).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The table is missing an expected column or holds it with the wrong type.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
