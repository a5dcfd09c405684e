//! HTTP client library for querying a Hydra CI server.
//!
//! This library provides a thin wrapper around reqwest for issuing GET
//! requests against the Hydra JSON API and for downloading plaintext
//! build products.
//!
//! # Examples
//!
//! ```rust,no_run
//! use hm_requests::ApiClient;
//!
//! # async fn example() -> Result<(), hm_requests::Error> {
//! let client = ApiClient::new("https://hydra.example.com")?;
//! let evals: serde_json::Value = client
//!     .get_json("api/latestevals", [("nr", "1"), ("project", "lvm2")])
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod prelude;

use std::borrow::Borrow;

use reqwest::{Url, header};
use serde::de::DeserializeOwned;
use tracing::debug;

pub use crate::error::Error;
use crate::prelude::*;

/// HTTP client for issuing queries against a CI server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    url: String,
    pub client: reqwest::Client,
}

impl ApiClient {
    /// Creates a new API client with the given base URL.
    ///
    /// A trailing `/` on the base URL is ignored.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .build()?;
        let url: String = url.into();
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL of the server, without a trailing `/`.
    pub fn base(&self) -> &str {
        &self.url
    }

    /// Constructs the full URL path for an endpoint.
    fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.url, endpoint.trim_start_matches('/'))
    }

    /// Builds the URL for `endpoint` with query parameters appended in
    /// iteration order.
    pub fn url<I, K, V>(&self, endpoint: &str, params: I) -> Result<Url>
    where
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Ok(Url::parse_with_params(&self.path(endpoint), params)?)
    }

    async fn get_url(&self, url: Url) -> Result<String> {
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Makes a GET request with query parameters and deserializes the JSON
    /// response.
    pub async fn get_json<T, I, K, V>(&self, endpoint: &str, params: I) -> Result<T>
    where
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: Borrow<(K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.url(endpoint, params)?;
        let body = self.get_url(url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Makes a GET request and returns the raw response body.
    pub async fn get_text(&self, endpoint: &str) -> Result<String> {
        let url = Url::parse(&self.path(endpoint))?;
        self.get_url(url).await
    }
}
