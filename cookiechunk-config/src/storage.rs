//! Configuration of the chunked cookie storage.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{CookieOptions, ConfigError, ConfigResult, MainConfig};

use super::default::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_CHUNKS};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// How session values are laid out in cookies.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
pub struct StorageConfig {
    /// The maximum encoded size of a single cookie value.
    #[serde(default = "super::default::default_chunk_size")]
    #[builder(default = super::default::default_chunk_size())]
    pub chunk_size: usize,

    /// The maximum number of chunks read or removed for one key.
    #[serde(default = "super::default::default_max_chunks")]
    #[builder(default = super::default::default_max_chunks())]
    pub max_chunks: usize,

    /// Options layered over the default cookie options.
    #[serde(default)]
    #[builder(default)]
    pub cookie: CookieOptions,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl MainConfig for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }

        if self.max_chunks == 0 {
            return Err(ConfigError::ZeroMaxChunks);
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
            cookie: CookieOptions::default(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
