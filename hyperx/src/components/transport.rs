//! Fetching component sources and stylesheets
//!
//! The loader only needs two primitives: an existence probe and a GET that
//! reports status and body. [`HttpTransport`] talks to a web server;
//! [`FsTransport`] reads from a local directory and reports missing files as
//! `404 Not Found`.

use async_trait::async_trait;
use http::StatusCode;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Transport-level failures (the request itself could not be completed)
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP client error
    #[error("HTTP request to '{url}' failed: {source}")]
    Http {
        /// Requested URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Filesystem error other than not-found
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Requested path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The location cannot be mapped by this transport
    #[error("invalid location '{0}'")]
    InvalidLocation(String),
}

/// A completed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Response status
    pub status: StatusCode,
    /// Response body as text
    pub body: String,
}

impl FetchResponse {
    /// Successful response with a body
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    /// Empty `404 Not Found`
    #[must_use]
    pub const fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: String::new(),
        }
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Fetch primitive used by the component loader
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether a resource exists at `url` (HEAD-style probe)
    ///
    /// Implementations should report unreachable resources as `Ok(false)`.
    async fn exists(&self, url: &str) -> Result<bool, TransportError>;

    /// Fetch the resource at `url`
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError>;
}

/// HTTP transport backed by `reqwest`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default client
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport with a preconfigured client
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exists(&self, url: &str) -> Result<bool, TransportError> {
        match self.client.head(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(err) => {
                tracing::debug!(url, error = %err, "HEAD probe failed");
                Ok(false)
            }
        }
    }

    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let http_err = |source| TransportError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(http::header::CACHE_CONTROL, "no-cache")
            .header(http::header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        let body = response.text().await.map_err(http_err)?;
        Ok(FetchResponse { status, body })
    }
}

/// Filesystem transport rooted at a directory
///
/// Locations are resolved relative to the root; a leading `/` is ignored
/// and `..` segments are rejected.
#[derive(Debug, Clone)]
pub struct FsTransport {
    root: PathBuf,
}

impl FsTransport {
    /// Create a transport serving files below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, TransportError> {
        let relative = location.trim_start_matches('/');
        if relative.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(TransportError::InvalidLocation(location.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Transport for FsTransport {
    async fn exists(&self, url: &str) -> Result<bool, TransportError> {
        let Ok(path) = self.resolve(url) else {
            return Ok(false);
        };
        Ok(tokio::fs::metadata(&path)
            .await
            .is_ok_and(|meta| meta.is_file()))
    }

    async fn get(&self, url: &str) -> Result<FetchResponse, TransportError> {
        let path = self.resolve(url)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(source) => Err(TransportError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
