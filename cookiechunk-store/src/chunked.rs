use futures::future;

use crate::{
    combine_chunks, delete_chunks, delete_chunks_from, split_chunks, Capabilities, Capability,
    Chunk, StoreError, StoreResult, DEFAULT_MAX_CHUNKS, MAX_CHUNK_SIZE,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Stores string values of any size on top of a store that limits the size of each entry.
///
/// Values that fit are written under their key unchanged. Larger values are split into chunks
/// named `key.0`, `key.1`, ... which are transparently recombined on read and removed together
/// on remove.
///
/// Reads and removes visit chunk indices one at a time in ascending order and stop at the first
/// missing index, so chunks sitting after a gap are neither read nor removed. Such a gap can only
/// appear if an earlier write failed part way or something outside this type touched the store.
#[derive(Debug, Clone)]
pub struct ChunkedStorage<O> {
    /// The entry-level operations of the underlying store.
    capabilities: Capabilities<O>,

    /// The maximum encoded size of a single entry.
    chunk_size: usize,

    /// The maximum number of chunk indices visited by reads and removes.
    max_chunks: usize,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<O> ChunkedStorage<O>
where
    O: Clone + Send + Sync + 'static,
{
    /// Creates a new `ChunkedStorage` over `capabilities` with the default chunk size.
    pub fn new(capabilities: Capabilities<O>) -> Self {
        Self {
            capabilities,
            chunk_size: MAX_CHUNK_SIZE,
            max_chunks: DEFAULT_MAX_CHUNKS,
        }
    }

    /// Sets the maximum encoded size of a single entry.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the maximum number of chunk indices visited by reads and removes.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Returns the capabilities of the underlying store.
    pub fn capabilities(&self) -> &Capabilities<O> {
        &self.capabilities
    }

    /// Returns the maximum encoded size of a single entry.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the maximum number of chunk indices visited by reads and removes.
    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Writes `value` under `key`, splitting it into chunks if it does not fit in one entry.
    ///
    /// All chunks are written concurrently and the write completes once every one of them has.
    /// Previously written chunks that the new value does not overwrite are left in place. Use
    /// [`replace`][Self::replace] to clear them.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingCapability` if no setter was provided. The first error from
    /// the setter is returned as is.
    pub async fn write(&self, key: &str, value: &str, options: O) -> StoreResult<()> {
        self.write_chunks(key, value, options).await?;
        Ok(())
    }

    /// Writes `value` under `key` like [`write`][Self::write], then removes whatever an earlier,
    /// differently shaped value left behind.
    ///
    /// Only the setter is required. When a getter and a remover are also present, a bare entry
    /// left by an unchunked value is removed after a chunked write, and chunks past the last one
    /// written are removed in ascending order. Without them this is the same as `write`.
    ///
    /// Nothing is removed if the write fails, so the previous value is never dropped before the
    /// new one is stored.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingCapability` if no setter was provided. Errors from the setter,
    /// getter or remover are returned as is.
    pub async fn replace(
        &self,
        key: &str,
        value: &str,
        set_options: O,
        remove_options: O,
    ) -> StoreResult<()> {
        let written = self.write_chunks(key, value, set_options).await?;

        let (Some(get), Some(remove)) = (&self.capabilities.get, &self.capabilities.remove) else {
            tracing::debug!(key, "cannot clear stale chunks without get and remove capabilities");
            return Ok(());
        };

        if written > 0 {
            let bare = get(key.to_string()).await?;
            if bare.is_some_and(|value| !value.is_empty()) {
                remove(key.to_string(), remove_options.clone()).await?;
            }
        }

        delete_chunks_from(
            key,
            written,
            |name| get(name),
            |name| remove(name, remove_options.clone()),
            self.max_chunks,
        )
        .await?;

        tracing::debug!(key, chunks = written, "replaced value");

        Ok(())
    }

    /// Reads the value stored under `key`, recombining chunks if needed.
    ///
    /// Returns `None` if nothing is stored under `key`, or if no getter was provided.
    ///
    /// # Errors
    ///
    /// Errors from the getter are returned as is.
    pub async fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let Some(get) = &self.capabilities.get else {
            tracing::debug!(key, "no get capability, treating value as missing");
            return Ok(None);
        };

        let value = combine_chunks(key, |name| get(name), self.max_chunks).await?;
        tracing::debug!(key, found = value.is_some(), "read value");

        Ok(value)
    }

    /// Removes the value stored under `key`, including every chunk it was split into.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::MissingCapability` if either the getter or the remover is missing.
    /// Without a getter there is no way to tell which chunks exist. Nothing is removed in
    /// either case. Errors from the getter or remover are returned as is.
    pub async fn remove(&self, key: &str, options: O) -> StoreResult<()> {
        let (get, remove) = match (&self.capabilities.get, &self.capabilities.remove) {
            (Some(get), Some(remove)) => (get, remove),
            (None, _) => {
                tracing::warn!(key, "cannot remove chunked value without a get capability");
                return Err(StoreError::MissingCapability(Capability::Get));
            }
            (Some(_), None) => {
                tracing::warn!(key, "cannot remove without a remove capability");
                return Err(StoreError::MissingCapability(Capability::Remove));
            }
        };

        delete_chunks(
            key,
            |name| get(name),
            |name| remove(name, options.clone()),
            self.max_chunks,
        )
        .await?;

        tracing::debug!(key, "removed value");

        Ok(())
    }

    /// Writes the chunks of `value` and returns how many indexed chunks were written, which is
    /// zero when the value went out unchunked.
    async fn write_chunks(&self, key: &str, value: &str, options: O) -> StoreResult<usize> {
        let Some(set) = &self.capabilities.set else {
            tracing::warn!(key, "cannot write without a set capability");
            return Err(StoreError::MissingCapability(Capability::Set));
        };

        let chunks = split_chunks(key, value, self.chunk_size)?;
        let indexed = match chunks.as_slice() {
            [chunk] if chunk.name == key => 0,
            chunks => chunks.len(),
        };

        tracing::debug!(key, chunks = chunks.len(), "writing value");

        future::try_join_all(
            chunks
                .into_iter()
                .map(|Chunk { name, value }| set(name, value, options.clone())),
        )
        .await?;

        Ok(indexed)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
