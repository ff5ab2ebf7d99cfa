//! HTTP client used by download tasks.
//!
//! One best-effort GET per rule file: no retries, no caching. The body is
//! written verbatim to the destination.

use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while running a download task.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("server answered HTTP {0}")]
    Status(u16),
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn network_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(e)
    }
}

/// Downloads remote rule files.
pub struct Fetcher {
    http: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("checkwire/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, timeout })
    }

    /// Fetch `url` into `destination`, creating parent directories.
    ///
    /// Returns the number of bytes written. Any non-2xx answer is an error
    /// and leaves the destination untouched.
    pub async fn fetch_to(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes().await.map_err(network_error)?;

        let write_err = |source| FetchError::Write {
            path: destination.to_path_buf(),
            source,
        };
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        tokio::fs::write(destination, &body).await.map_err(write_err)?;
        Ok(body.len() as u64)
    }
}
