//! # Cookiechunk Store
//!
//! This crate stores string values of any size in stores that limit how large a single entry can
//! be, such as cookies. Oversized values are split into numbered chunks on write, recombined on
//! read and cleaned up on remove.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod capabilities;
mod chunked;
mod chunker;
mod error;
mod memjar;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use capabilities::*;
pub use chunked::*;
pub use chunker::*;
pub use error::*;
pub use memjar::*;
