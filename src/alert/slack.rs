//! Slack `chat.postMessage` transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::alert::{AlertError, AlertSink};
use crate::config::AlertConfig;
use crate::poller::error::body_snippet;

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts alerts to a Slack channel with a bot token.
#[derive(Clone)]
pub struct SlackAlertSink {
    client: reqwest::Client,
    api_url: String,
    channel: String,
    token: String,
}

impl SlackAlertSink {
    pub fn new(client: reqwest::Client, config: &AlertConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            channel: config.channel.clone(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl AlertSink for SlackAlertSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, message: &str) -> Result<(), AlertError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel: &self.channel,
                text: message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(AlertError::Status {
                status: status.as_u16(),
                body: body_snippet(&body),
            });
        }

        let reply: PostMessageReply = response.json().await?;
        if !reply.ok {
            return Err(AlertError::Rejected(
                reply.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SlackAlertSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackAlertSink")
            .field("api_url", &self.api_url)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
