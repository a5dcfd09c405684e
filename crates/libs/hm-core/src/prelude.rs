//! Common types and utilities.

/// Aggregation error type.
pub use crate::error::Error;

/// Aggregation result type.
pub type Result<T> = core::result::Result<T, Error>;
