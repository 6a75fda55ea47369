//! Episode sources: RSS feeds and the iTunes directory search.
//!
//! Both fetchers go through [`Transport`] so the HTTP layer can be swapped
//! for canned responses in tests. Neither fetcher returns an error: every
//! failure becomes a [`SourceFailure`] in the [`FetchReport`].

pub mod directory;
pub mod rss;

use crate::error::{AppError, AppResult};
use crate::models::Episode;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

pub use directory::DirectorySearch;
pub use rss::RssFetcher;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("podcast-digest/", env!("CARGO_PKG_VERSION"));

/// Raw GET access to a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> AppResult<Vec<u8>>;
}

/// reqwest-backed transport used outside tests
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> AppResult<Vec<u8>> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection, DNS or timeout
    Network,
    /// Non-2xx response
    Status,
    /// Body was not a valid feed / JSON document
    Parse,
}

impl FailureKind {
    pub fn classify(error: &AppError) -> Self {
        match error {
            AppError::Status { .. } => Self::Status,
            AppError::Feed(_) | AppError::Json(_) => Self::Parse,
            AppError::Http(e) if e.is_decode() => Self::Parse,
            AppError::Http(e) if e.is_status() => Self::Status,
            _ => Self::Network,
        }
    }
}

/// One source that could not be read during a run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub kind: FailureKind,
    pub message: String,
}

impl SourceFailure {
    pub fn new(source: &str, error: &AppError) -> Self {
        Self {
            source: source.to_string(),
            kind: FailureKind::classify(error),
            message: error.to_string(),
        }
    }
}

/// Episodes accepted from a source plus the failures met along the way.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub episodes: Vec<Episode>,
    pub failures: Vec<SourceFailure>,
}

impl FetchReport {
    pub fn failed(&self) -> bool {
        !self.failures.is_empty()
    }
}
