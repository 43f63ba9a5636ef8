//! Source polling.
//!
//! # Responsibilities
//! - Issue one GET against the configured source per call
//! - Require status 200, then a matching `Content-Type` prefix
//! - Return the raw body with its declared content type
//!
//! # Design Decisions
//! - No retries; repeated failure is the breaker's concern
//! - Status is checked before content type so error pages report their status

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::config::SourceConfig;
use crate::poller::error::{body_snippet, FetchError};

/// A fetched payload, alive for a single tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResult {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Source of the payload forwarded each tick.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn poll(&self) -> Result<PollResult, FetchError>;
}

/// `Fetcher` backed by an HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    url: String,
    expected_mime_type: String,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, config: &SourceConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            expected_mime_type: config.expected_mime_type.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn poll(&self) -> Result<PollResult, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !mime_matches(&content_type, &self.expected_mime_type) {
            return Err(FetchError::MimeMismatch {
                expected: self.expected_mime_type.clone(),
                actual: content_type,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: self.url.clone(),
            source,
        })?;

        Ok(PollResult {
            body: body.to_vec(),
            content_type,
        })
    }
}

/// Case-insensitive prefix match of a `Content-Type` value.
pub fn mime_matches(content_type: &str, expected: &str) -> bool {
    content_type
        .get(..expected.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(expected))
}
