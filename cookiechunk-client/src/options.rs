use cookiechunk_config::{CookieOptions, StorageConfig};
use cookiechunk_store::Capabilities;
use typed_builder::TypedBuilder;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The OAuth flow the auth client uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowType {
    /// Authorization code flow with proof key for code exchange.
    #[default]
    Pkce,

    /// Implicit flow.
    Implicit,
}

/// Settings of the auth client.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct AuthOptions {
    /// The OAuth flow to use.
    #[builder(default)]
    pub flow_type: FlowType,

    /// Whether the session is persisted to storage.
    #[builder(default = true)]
    pub persist_session: bool,

    /// Whether the session is refreshed in the background.
    #[builder(default)]
    pub auto_refresh_token: bool,

    /// Whether a session is picked up from the URL after a redirect.
    #[builder(default)]
    pub detect_session_in_url: bool,
}

/// Options for creating a client.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ClientOptions {
    /// The cookie operations session storage is built on.
    #[builder(default)]
    pub cookies: Capabilities<CookieOptions>,

    /// The chunk layout and cookie options of session storage.
    #[builder(default)]
    pub storage: StorageConfig,

    /// Settings of the auth client.
    #[builder(default)]
    pub auth: AuthOptions,

    /// Whether [`create_browser_client`][crate::create_browser_client] returns the process-wide
    /// client instead of a new one. Ignored by
    /// [`create_server_client`][crate::create_server_client].
    #[builder(default = true)]
    pub singleton: bool,
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for AuthOptions {
    fn default() -> Self {
        Self {
            flow_type: FlowType::Pkce,
            persist_session: true,
            auto_refresh_token: false,
            detect_session_in_url: false,
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}
