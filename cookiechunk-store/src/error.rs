use std::{error::Error, fmt::Display};

use thiserror::Error;

use crate::Capability;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a chunked store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// An error that occurred during a chunked store operation.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    /// A percent-encoded chunk could not be decoded back into a string.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// The chunk size limit must be at least one.
    #[error("Invalid chunk size: chunk size must be greater than zero")]
    InvalidChunkSize,

    /// The operation needs a capability the caller did not provide.
    #[error("Missing capability: {0} is required for this operation")]
    MissingCapability(Capability),

    /// The store kept reporting chunks past the traversal bound.
    #[error("Chunk limit exceeded: {key} has more than {limit} chunks")]
    ChunkLimitExceeded {
        /// The logical key being traversed.
        key: String,

        /// The traversal bound that was hit.
        limit: usize,
    },

    /// Custom error.
    #[error("Custom error: {0}")]
    Custom(#[from] AnyError),
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StoreError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> StoreError {
        StoreError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl PartialEq for AnyError {
    fn eq(&self, other: &Self) -> bool {
        self.error.to_string() == other.error.to_string()
    }
}

impl Display for AnyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
