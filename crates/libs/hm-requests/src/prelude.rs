//! Common types and utilities.

/// Query client error type.
pub use crate::error::Error;

/// Query client result type.
pub type Result<T> = core::result::Result<T, Error>;
