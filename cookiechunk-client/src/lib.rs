//! # Cookiechunk Client
//!
//! This crate wires chunked cookie storage in as the session storage backend of an auth client.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod client;
mod error;
mod options;
mod storage;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use client::*;
pub use error::*;
pub use options::*;
pub use storage::*;

//--------------------------------------------------------------------------------------------------
// Re-Exports
//--------------------------------------------------------------------------------------------------

/// Re-exports of the cookiechunk crates this client is built on.
pub mod reexports {
    pub use cookiechunk_config as config;
    pub use cookiechunk_store as store;
}
