use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use cookiechunk_config::MainConfig;
use lazy_static::lazy_static;
use url::Url;

use crate::{AuthOptions, AuthStorage, ClientError, ClientOptions, ClientResult, CookieAuthStorage};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The header identifying this library to the auth server.
pub const CLIENT_INFO_HEADER: &str = "X-Client-Info";

/// The value of the [`CLIENT_INFO_HEADER`].
pub const CLIENT_INFO: &str = concat!("cookiechunk/", env!("CARGO_PKG_VERSION"));

lazy_static! {
    /// The client shared by singleton-mode browser clients. Created at most once per process and
    /// kept for the lifetime of the process.
    static ref BROWSER_CLIENT: Mutex<Option<Arc<Client>>> = Mutex::new(None);
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An auth client that persists its session in chunked cookies.
#[derive(Debug)]
pub struct Client {
    url: Url,
    key: String,
    storage_key: String,
    headers: BTreeMap<String, String>,
    auth: AuthOptions,
    storage: Arc<dyn AuthStorage>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Client {
    fn new(url: &str, key: &str, options: ClientOptions) -> ClientResult<Self> {
        options.storage.validate()?;

        let url = Url::parse(url).map_err(|e| ClientError::InvalidUrl(format!("{url}: {e}")))?;
        let storage_key = match &options.storage.cookie.name {
            Some(name) => name.clone(),
            None => default_storage_key(&url)?,
        };

        let headers = BTreeMap::from([(CLIENT_INFO_HEADER.to_string(), CLIENT_INFO.to_string())]);
        let storage = CookieAuthStorage::new(options.cookies, &options.storage);

        tracing::debug!(%url, %storage_key, "created client");

        Ok(Self {
            url,
            key: key.to_string(),
            storage_key,
            headers,
            auth: options.auth,
            storage: Arc::new(storage),
        })
    }

    /// Returns the project URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the project key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the key the session is stored under.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Returns the headers sent with every request.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns the auth settings.
    pub fn auth(&self) -> &AuthOptions {
        &self.auth
    }

    /// Returns the session storage.
    pub fn storage(&self) -> &Arc<dyn AuthStorage> {
        &self.storage
    }

    /// Gets the persisted session, if any.
    pub async fn get_session(&self) -> ClientResult<Option<String>> {
        if !self.auth.persist_session {
            return Ok(None);
        }

        Ok(self.storage.get_item(&self.storage_key).await?)
    }

    /// Persists `session`, replacing any previous one.
    pub async fn set_session(&self, session: &str) -> ClientResult<()> {
        if !self.auth.persist_session {
            tracing::debug!("session persistence is disabled, not storing session");
            return Ok(());
        }

        Ok(self.storage.set_item(&self.storage_key, session).await?)
    }

    /// Removes the persisted session.
    pub async fn clear_session(&self) -> ClientResult<()> {
        if !self.auth.persist_session {
            return Ok(());
        }

        Ok(self.storage.remove_item(&self.storage_key).await?)
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates a client for server-side use. A new client is returned on every call.
///
/// # Errors
///
/// Returns `ClientError::MissingProjectCredentials` if `url` or `key` is empty and
/// `ClientError::InvalidUrl` if `url` cannot be parsed.
pub fn create_server_client(url: &str, key: &str, options: ClientOptions) -> ClientResult<Client> {
    check_credentials(url, key)?;
    Client::new(url, key, options)
}

/// Creates a client for browser-side use.
///
/// In singleton mode the first client created in the process is kept and returned by every later
/// call, whatever arguments those calls pass. Otherwise a new client is returned on every call.
///
/// # Errors
///
/// Returns `ClientError::MissingProjectCredentials` if `url` or `key` is empty and
/// `ClientError::InvalidUrl` if `url` cannot be parsed.
pub fn create_browser_client(
    url: &str,
    key: &str,
    options: ClientOptions,
) -> ClientResult<Arc<Client>> {
    check_credentials(url, key)?;

    if !options.singleton {
        return Ok(Arc::new(Client::new(url, key, options)?));
    }

    let mut cached = BROWSER_CLIENT
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(client) = cached.as_ref() {
        tracing::trace!("reusing cached browser client");
        return Ok(client.clone());
    }

    let client = Arc::new(Client::new(url, key, options)?);
    *cached = Some(client.clone());

    Ok(client)
}

fn check_credentials(url: &str, key: &str) -> ClientResult<()> {
    if url.is_empty() || key.is_empty() {
        return Err(ClientError::MissingProjectCredentials);
    }

    Ok(())
}

/// Derives the storage key from the first label of the project host.
fn default_storage_key(url: &Url) -> ClientResult<String> {
    let host = url
        .host_str()
        .ok_or_else(|| ClientError::InvalidUrl(format!("{url}: missing host")))?;

    let project_ref = host.split('.').next().unwrap_or(host);

    Ok(format!("sb-{project_ref}-auth-token"))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
