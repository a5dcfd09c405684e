//! Query client error types.

/// Query client errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be sent or its body could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The request URL could not be built.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// The response body was not the expected JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("GET {url} returned HTTP {status}")]
    Status { status: u16, url: String },
}
