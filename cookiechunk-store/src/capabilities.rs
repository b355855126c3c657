use std::{
    fmt::{self, Debug, Display},
    future::{self, Future},
    sync::Arc,
};

use futures::{future::BoxFuture, FutureExt};

use crate::StoreResult;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Reads a single named entry. Absent and empty values both mean the entry is missing.
pub type GetFn =
    Arc<dyn Fn(String) -> BoxFuture<'static, StoreResult<Option<String>>> + Send + Sync>;

/// Writes a single named entry with caller-defined options.
pub type SetFn<O> =
    Arc<dyn Fn(String, String, O) -> BoxFuture<'static, StoreResult<()>> + Send + Sync>;

/// Removes a single named entry with caller-defined options.
pub type RemoveFn<O> =
    Arc<dyn Fn(String, O) -> BoxFuture<'static, StoreResult<()>> + Send + Sync>;

/// Names one of the three capabilities a caller can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Reading a named entry.
    Get,

    /// Writing a named entry.
    Set,

    /// Removing a named entry.
    Remove,
}

/// The set of entry-level operations a caller supplies to [`ChunkedStorage`][crate::ChunkedStorage].
///
/// Each capability is independently optional. Which ones are required depends on the operation:
/// writes need `set`, removes need both `get` and `remove`, and reads without `get` simply find
/// nothing.
///
/// `O` is the caller's options type. It is forwarded untouched to `set` and `remove`.
pub struct Capabilities<O> {
    /// Reads a named entry.
    pub get: Option<GetFn>,

    /// Writes a named entry.
    pub set: Option<SetFn<O>>,

    /// Removes a named entry.
    pub remove: Option<RemoveFn<O>>,
}

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A store of small named string entries, such as a cookie jar.
pub trait CookieStore<O>: Clone {
    /// Gets the value stored under `name`, if any.
    fn get(&self, name: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Stores `value` under `name`.
    fn set(
        &self,
        name: &str,
        value: &str,
        options: O,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Removes the entry stored under `name`.
    fn remove(&self, name: &str, options: O) -> impl Future<Output = StoreResult<()>> + Send;
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<O> Capabilities<O>
where
    O: Send + 'static,
{
    /// Creates an empty capability set.
    pub fn new() -> Self {
        Self {
            get: None,
            set: None,
            remove: None,
        }
    }

    /// Wires all three capabilities to the given `store`.
    pub fn from_store<S>(store: S) -> Self
    where
        S: CookieStore<O> + Send + Sync + 'static,
    {
        let getter = store.clone();
        let setter = store.clone();
        let remover = store;

        Self::new()
            .with_get(move |name| {
                let store = getter.clone();
                async move { store.get(&name).await }
            })
            .with_set(move |name, value, options| {
                let store = setter.clone();
                async move { store.set(&name, &value, options).await }
            })
            .with_remove(move |name, options| {
                let store = remover.clone();
                async move { store.remove(&name, options).await }
            })
    }

    /// Sets an asynchronous getter.
    pub fn with_get<F, Fut>(mut self, get: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<Option<String>>> + Send + 'static,
    {
        self.get = Some(Arc::new(move |name| get(name).boxed()));
        self
    }

    /// Sets a synchronous getter.
    pub fn with_get_sync<F>(mut self, get: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.get = Some(Arc::new(move |name: String| {
            let value: StoreResult<Option<String>> = Ok(get(&name));
            future::ready(value).boxed()
        }));
        self
    }

    /// Sets the setter.
    pub fn with_set<F, Fut>(mut self, set: F) -> Self
    where
        F: Fn(String, String, O) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<()>> + Send + 'static,
    {
        self.set = Some(Arc::new(move |name, value, options| {
            set(name, value, options).boxed()
        }));
        self
    }

    /// Sets the remover.
    pub fn with_remove<F, Fut>(mut self, remove: F) -> Self
    where
        F: Fn(String, O) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StoreResult<()>> + Send + 'static,
    {
        self.remove = Some(Arc::new(move |name, options| remove(name, options).boxed()));
        self
    }
}

impl<O> Capabilities<O> {
    /// Returns `true` if the given capability was provided.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Get => self.get.is_some(),
            Capability::Set => self.set.is_some(),
            Capability::Remove => self.remove.is_some(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<O> Default for Capabilities<O>
where
    O: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<O> Clone for Capabilities<O> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
            remove: self.remove.clone(),
        }
    }
}

impl<O> Debug for Capabilities<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("get", &self.get.is_some())
            .field("set", &self.set.is_some())
            .field("remove", &self.remove.is_some())
            .finish()
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Get => write!(f, "get"),
            Capability::Set => write!(f, "set"),
            Capability::Remove => write!(f, "remove"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
