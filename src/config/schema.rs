//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the poller.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the poller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PollerConfig {
    /// Upstream resource that is polled every tick.
    pub source: SourceConfig,

    /// Downstream webhook that receives the fetched payload.
    pub sink: SinkConfig,

    /// Tick interval.
    pub schedule: ScheduleConfig,

    /// Operator alert channel.
    pub alert: AlertConfig,

    /// Circuit breaker tuning.
    pub breaker: BreakerConfig,

    /// Forwarding policy.
    pub policy: PolicyConfig,

    /// HTTP client timeouts shared by fetch, forward and alert calls.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Source endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL fetched with GET on every tick.
    pub url: String,

    /// Required prefix of the response `Content-Type`.
    pub expected_mime_type: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://jsonplaceholder.typicode.com/todos/1".to_string(),
            expected_mime_type: "application/json".to_string(),
        }
    }
}

/// Sink endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Webhook URL receiving the payload with POST.
    pub url: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Poll interval in seconds.
    pub interval_secs: u64,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { interval_secs: 5 }
    }
}

/// Operator alert channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Channel identifier (e.g., "#ops-alerts").
    pub channel: String,

    /// Auth token. Empty disables alerting.
    pub token: String,

    /// Chat API endpoint used to post messages.
    pub api_url: String,

    /// Upper bound on a single delivery attempt in seconds.
    pub timeout_secs: u64,
}

impl AlertConfig {
    /// Alerting is active only when a token is configured.
    pub fn is_enabled(&self) -> bool {
        !self.token.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            channel: "#channel-name".to_string(),
            token: String::new(),
            api_url: "https://slack.com/api/chat.postMessage".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the breaker.
    pub failure_threshold: u32,

    /// Closed-state window after which failure counters are cleared.
    /// Zero keeps counting until a success.
    pub failure_window_secs: u64,

    /// Time spent Open before trial requests are admitted.
    pub cooldown_secs: u64,

    /// Trial requests allowed through while Half-Open.
    pub max_trial_requests: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window_secs: 60,
            cooldown_secs: 60,
            max_trial_requests: 1,
        }
    }
}

/// Forwarding policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Skip forwarding when the source returned an empty body.
    pub skip_empty_payloads: bool,
}

/// Timeout configuration for outbound HTTP calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Also append logs to this file (e.g. "polldancer.log").
    pub log_file: Option<PathBuf>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_file: None,
        }
    }
}
