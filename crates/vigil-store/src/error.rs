use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Operation targeted a record that does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The transport to the store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A document failed to encode or decode.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A document exists but does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
