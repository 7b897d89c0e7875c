//! Common utilities for texcache.
//!
//! This crate provides the foundational pieces shared by the texcache crates:
//!
//! - [`StreamReader`] - Forward-only little-endian reader over any [`std::io::Read`]
//! - [`alloc_buffer`] / [`reserve_buffer`] - Fallible allocation of byte buffers

mod error;
mod reader;

pub use error::{Error, Result};
pub use reader::{alloc_buffer, reserve_buffer, StreamReader};
