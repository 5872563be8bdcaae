//! The network edge of OGP resolution.
//!
//! [`PageFetcher`] is the seam: the cache talks to the trait, production
//! code plugs in [`HttpFetcher`], tests plug in a canned mock. The real
//! fetcher issues exactly one GET per call with a fixed timeout, a browser
//! user-agent, and a bounded body read — metadata lives in `<head>`, so a
//! capped read loses nothing that matters.

use std::io::Read;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// User-agent sent with OGP fetches. Some sites serve stripped-down pages
/// (or block outright) for obvious bot agents, so a browser string fares
/// better.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_BODY_KIB: u64 = 2048;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read response body: {0}")]
    Body(std::io::Error),
}

/// A fetched page: the final URL after redirects plus the (bounded) body.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

/// Outbound HTTP seam for OGP resolution.
pub trait PageFetcher: Sync {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Options for the real fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_body_kib: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_body_kib: DEFAULT_MAX_BODY_KIB,
        }
    }
}

/// Blocking `reqwest` fetcher.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(options.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            max_body_bytes: options.max_body_kib * 1024,
        })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let mut body = Vec::new();
        response
            .take(self.max_body_bytes)
            .read_to_end(&mut body)
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::TimedOut {
                    FetchError::Timeout
                } else {
                    FetchError::Body(e)
                }
            })?;

        Ok(FetchedPage {
            url: final_url,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
