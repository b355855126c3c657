use std::{error::Error, fmt::Display};

use cookiechunk_config::ConfigError;
use cookiechunk_store::StoreError;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A type alias for a `Result` that uses `ClientError` as the error type.
pub type ClientResult<T> = Result<T, ClientError>;

/// An error that occurred while creating or using a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The project URL or key was empty.
    #[error("Project URL and key are required to create a client")]
    MissingProjectCredentials,

    /// The project URL could not be used.
    #[error("Invalid project URL: {0}")]
    InvalidUrl(String),

    /// Store error.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Config error.
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),

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

impl ClientError {
    /// Creates a new `Err` result.
    pub fn custom(error: impl Into<anyhow::Error>) -> ClientError {
        ClientError::Custom(AnyError {
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
