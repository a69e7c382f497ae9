//! Fetching the range lists and the location dataset when no local copy
//! exists. Downloads are cached next to the other inputs and every later run
//! reads the cached file; lookups never touch the network.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::{self, ExportError};

pub const DEFAULT_V4_URL: &str = "https://www.baipiao.eu.org/cloudflare/ips-v4";
pub const DEFAULT_V6_URL: &str = "https://www.baipiao.eu.org/cloudflare/ips-v6";
pub const DEFAULT_LOCATIONS_URL: &str = "https://speed.cloudflare.com/locations";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build the HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} returned nothing usable")]
    Unusable { url: String },
    #[error(transparent)]
    Store(#[from] ExportError),
}

/// Downloads dataset files into a local cache.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// GETs `url` and returns the body text. Non-success statuses are errors.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let request_failed = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_failed)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(request_failed)
    }

    /// Makes sure `path` exists, downloading it from `url` if it does not.
    ///
    /// `usable` vets the body before it is written, so a bad download never
    /// becomes the cached copy. Returns whether a download happened.
    pub async fn cache<F>(&self, path: &Path, url: &str, usable: F) -> Result<bool, FetchError>
    where
        F: FnOnce(&str) -> bool,
    {
        if path.exists() {
            debug!("Using cached {}", path.display());
            return Ok(false);
        }

        info!("{} not found, downloading it from {url}", path.display());
        let body = self.fetch(url).await?;
        if !usable(&body) {
            return Err(FetchError::Unusable {
                url: url.to_string(),
            });
        }

        export::persist(path, |w| w.write_all(body.as_bytes()))?;
        info!("Saved {} ({} bytes)", path.display(), body.len());
        Ok(true)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
