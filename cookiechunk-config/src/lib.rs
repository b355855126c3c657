//! # Cookiechunk Config
//!
//! This crate provides the cookie options and storage configuration used by the cookiechunk
//! crates.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod cookie;
mod error;
mod storage;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod default;

pub use cookie::*;
pub use error::*;
pub use storage::*;
pub use traits::*;
