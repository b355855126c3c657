//! Cookie options forwarded to the cookie store.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The `SameSite` attribute of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Sent with top-level navigations and same-site requests.
    Lax,

    /// Sent with same-site requests only.
    Strict,

    /// Sent with all requests. Browsers require `secure` along with it.
    None,
}

/// Options passed along with every cookie that is set or removed.
///
/// These are never interpreted by the chunking layer. Every field is optional so that a partial
/// set of options can be layered over the defaults with [`merge`][Self::merge].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct CookieOptions {
    /// The cookie name. When set it is used as the storage key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub name: Option<String>,

    /// The `Domain` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub domain: Option<String>,

    /// The `Path` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option, into))]
    pub path: Option<String>,

    /// The `SameSite` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub same_site: Option<SameSite>,

    /// The `HttpOnly` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub http_only: Option<bool>,

    /// The `Secure` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub secure: Option<bool>,

    /// The `Max-Age` attribute, in seconds. Zero expires the cookie immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub max_age: Option<u64>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl CookieOptions {
    /// Returns a copy of `self` with every field that is set in `overrides` replaced.
    pub fn merge(&self, overrides: &CookieOptions) -> CookieOptions {
        CookieOptions {
            name: overrides.name.clone().or_else(|| self.name.clone()),
            domain: overrides.domain.clone().or_else(|| self.domain.clone()),
            path: overrides.path.clone().or_else(|| self.path.clone()),
            same_site: overrides.same_site.or(self.same_site),
            http_only: overrides.http_only.or(self.http_only),
            secure: overrides.secure.or(self.secure),
            max_age: overrides.max_age.or(self.max_age),
        }
    }

    /// Returns a copy of `self` with `max_age` replaced.
    pub fn with_max_age(mut self, max_age: u64) -> CookieOptions {
        self.max_age = Some(max_age);
        self
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::default;

    use super::*;

    #[test]
    fn test_cookie_options_merge() {
        let defaults = default::default_cookie_options();
        let overrides = CookieOptions::builder()
            .domain("example.com")
            .secure(true)
            .same_site(SameSite::Strict)
            .build();

        let merged = defaults.merge(&overrides);

        assert_eq!(merged.domain.as_deref(), Some("example.com"));
        assert_eq!(merged.path.as_deref(), Some("/"));
        assert_eq!(merged.same_site, Some(SameSite::Strict));
        assert_eq!(merged.secure, Some(true));
        assert_eq!(merged.http_only, Some(false));
        assert_eq!(merged.max_age, Some(default::DEFAULT_COOKIE_MAX_AGE));
    }

    #[test]
    fn test_cookie_options_merge_empty_overrides() {
        let defaults = default::default_cookie_options();
        assert_eq!(defaults.merge(&CookieOptions::default()), defaults);
    }

    #[test_log::test]
    fn test_cookie_options_toml() -> anyhow::Result<()> {
        let options: CookieOptions = toml::from_str(
            r#"
            name = "my-session"
            same_site = "none"
            secure = true
            max_age = 0
            "#,
        )?;

        tracing::debug!(?options);

        assert_eq!(options.name.as_deref(), Some("my-session"));
        assert_eq!(options.same_site, Some(SameSite::None));
        assert_eq!(options.secure, Some(true));
        assert_eq!(options.max_age, Some(0));
        assert_eq!(options.path, None);

        let serialized = toml::to_string(&options)?;
        assert!(!serialized.contains("path"));

        Ok(())
    }
}
