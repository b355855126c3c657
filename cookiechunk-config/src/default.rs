//! Default configuration values.

use crate::{CookieOptions, SameSite};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default maximum encoded size of a single cookie.
pub const DEFAULT_CHUNK_SIZE: usize = cookiechunk_store::MAX_CHUNK_SIZE;

/// The default upper bound on the number of chunks read or removed for one key.
pub const DEFAULT_MAX_CHUNKS: usize = cookiechunk_store::DEFAULT_MAX_CHUNKS;

/// The default `Path` of session cookies.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// The default `Max-Age` of session cookies, in seconds.
pub const DEFAULT_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365 * 1000;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the options session cookies are written with unless overridden.
pub fn default_cookie_options() -> CookieOptions {
    CookieOptions::builder()
        .path(DEFAULT_COOKIE_PATH)
        .same_site(SameSite::Lax)
        .http_only(false)
        .max_age(DEFAULT_COOKIE_MAX_AGE)
        .build()
}

pub(crate) const fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

pub(crate) const fn default_max_chunks() -> usize {
    DEFAULT_MAX_CHUNKS
}
