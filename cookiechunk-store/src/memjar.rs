use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{CookieStore, StoreResult};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An in-memory cookie jar.
///
/// Entries are kept in name order, which makes it easy to inspect the chunks a value was split
/// into. Options passed to `set` and `remove` are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemoryCookieJar {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl MemoryCookieJar {
    /// Creates a new empty `MemoryCookieJar`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `name` without going through the store interface.
    pub async fn get_raw(&self, name: &str) -> Option<String> {
        self.entries.read().await.get(name).cloned()
    }

    /// Stores `value` under `name` without going through the store interface.
    pub async fn insert_raw(&self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.write().await.insert(name.into(), value.into());
    }

    /// Returns the names of all entries in the jar, in order.
    pub async fn names(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }

    /// Returns the number of entries in the jar.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the jar holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<O> CookieStore<O> for MemoryCookieJar
where
    O: Send,
{
    async fn get(&self, name: &str) -> StoreResult<Option<String>> {
        Ok(self.get_raw(name).await)
    }

    async fn set(&self, name: &str, value: &str, _options: O) -> StoreResult<()> {
        self.insert_raw(name, value).await;
        Ok(())
    }

    async fn remove(&self, name: &str, _options: O) -> StoreResult<()> {
        self.entries.write().await.remove(name);
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
