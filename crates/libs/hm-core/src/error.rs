//! Aggregation error types.

/// Aggregation errors.
///
/// Individual query failures never abort an aggregation run; they are
/// returned from [`crate::api::CiApi`] and degraded by the caller.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A CI server query failed.
    #[error(transparent)]
    Requests(#[from] hm_requests::Error),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] hm_config::error::Error),
}
