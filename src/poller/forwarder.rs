//! Sink delivery.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::config::SinkConfig;
use crate::poller::error::{body_snippet, ForwardError};

/// Destination for payloads that pass the policy.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Deliver `payload` declared as `mime_type`. Empty payloads are valid.
    async fn send(&self, payload: &[u8], mime_type: &str) -> Result<(), ForwardError>;
}

/// `Forwarder` backed by an HTTP POST to a webhook.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    client: reqwest::Client,
    url: String,
}

impl HttpForwarder {
    pub fn new(client: reqwest::Client, config: &SinkConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn send(&self, payload: &[u8], mime_type: &str) -> Result<(), ForwardError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, mime_type)
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|source| ForwardError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ForwardError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        Ok(())
    }
}
