use std::fmt::Debug;

use async_trait::async_trait;
use cookiechunk_config::{
    default::{default_cookie_options, DEFAULT_COOKIE_MAX_AGE},
    CookieOptions, StorageConfig,
};
use cookiechunk_store::{Capabilities, ChunkedStorage, StoreResult};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The storage an auth client persists its session in.
#[async_trait]
pub trait AuthStorage: Debug + Send + Sync {
    /// Gets the item stored under `key`.
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`.
    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes the item stored under `key`.
    async fn remove_item(&self, key: &str) -> StoreResult<()>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Session storage backed by cookies, splitting values that do not fit in a single cookie.
///
/// Cookies are written with the default cookie options overridden by the configured ones, and a
/// long `Max-Age`. Cookies are removed with the same options and a `Max-Age` of zero. Setting an
/// item clears the cookies a previous, longer value left behind when the cookie capabilities
/// allow it.
#[derive(Debug, Clone)]
pub struct CookieAuthStorage {
    storage: ChunkedStorage<CookieOptions>,
    cookie_options: CookieOptions,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CookieAuthStorage {
    /// Creates a new `CookieAuthStorage` over the given cookie `capabilities`.
    pub fn new(capabilities: Capabilities<CookieOptions>, config: &StorageConfig) -> Self {
        let storage = ChunkedStorage::new(capabilities)
            .with_chunk_size(config.chunk_size)
            .with_max_chunks(config.max_chunks);

        Self {
            storage,
            cookie_options: default_cookie_options().merge(&config.cookie),
        }
    }

    /// Returns the underlying chunked storage.
    pub fn storage(&self) -> &ChunkedStorage<CookieOptions> {
        &self.storage
    }

    /// Returns the options cookies are written with.
    pub fn set_options(&self) -> CookieOptions {
        self.cookie_options
            .clone()
            .with_max_age(DEFAULT_COOKIE_MAX_AGE)
    }

    /// Returns the options cookies are removed with.
    pub fn remove_options(&self) -> CookieOptions {
        self.cookie_options.clone().with_max_age(0)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl AuthStorage for CookieAuthStorage {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage.read(key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        self.storage
            .replace(key, value, self.set_options(), self.remove_options())
            .await
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        self.storage.remove(key, self.remove_options()).await
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
