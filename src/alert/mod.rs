//! Operator alerting.
//!
//! # Responsibilities
//! - Deliver a human-readable failure message to an operator channel
//! - Never fail or retry the caller's tick because of alert trouble
//!
//! # Design Decisions
//! - Transport is an `AlertSink` trait object chosen at construction
//! - No token configured means no sink: messages are dropped silently
//! - Each delivery is bounded by a timeout; errors become events, not results

pub mod slack;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AlertConfig;
use crate::observability::{EventSink, PollerEvent};

pub use slack::SlackAlertSink;

/// Errors from a single delivery attempt. Never leave the alerter.
#[derive(Debug, Error)]
pub enum AlertError {
    #[error("alert transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("alert channel returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("alert rejected by channel: {0}")]
    Rejected(String),

    #[error("alert delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// A concrete notification transport.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Short transport name for logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, message: &str) -> Result<(), AlertError>;
}

/// Best-effort notifier used by the scheduler.
#[derive(Clone)]
pub struct Alerter {
    sink: Option<Arc<dyn AlertSink>>,
    timeout: Duration,
    events: Arc<dyn EventSink>,
}

impl Alerter {
    pub fn new(sink: Arc<dyn AlertSink>, timeout: Duration, events: Arc<dyn EventSink>) -> Self {
        Self {
            sink: Some(sink),
            timeout,
            events,
        }
    }

    /// An alerter that drops every message.
    pub fn disabled(events: Arc<dyn EventSink>) -> Self {
        Self {
            sink: None,
            timeout: Duration::ZERO,
            events,
        }
    }

    /// Slack-backed alerter, or a disabled one when no token is set.
    pub fn from_config(
        config: &AlertConfig,
        client: reqwest::Client,
        events: Arc<dyn EventSink>,
    ) -> Self {
        if !config.is_enabled() {
            return Self::disabled(events);
        }
        Self::new(
            Arc::new(SlackAlertSink::new(client, config)),
            config.timeout(),
            events,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Send `message`, swallowing every delivery failure.
    pub async fn notify(&self, message: &str) {
        let Some(sink) = &self.sink else {
            self.events.emit(PollerEvent::AlertSkipped);
            return;
        };

        let outcome = match tokio::time::timeout(self.timeout, sink.deliver(message)).await {
            Ok(result) => result,
            Err(_) => Err(AlertError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(()) => self.events.emit(PollerEvent::AlertDelivered { sink: sink.name() }),
            Err(error) => self.events.emit(PollerEvent::AlertFailed {
                sink: sink.name(),
                error: error.to_string(),
            }),
        }
    }
}

impl std::fmt::Debug for Alerter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alerter")
            .field("sink", &self.sink.as_ref().map(|s| s.name()))
            .field("timeout", &self.timeout)
            .finish()
    }
}
