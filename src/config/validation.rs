//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint URLs and value ranges (intervals > 0, thresholds >= 1)
//! - Check cross-field rules (an alert token needs a channel, the breaker
//!   window must fit a full failure streak at the polling interval)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PollerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::PollerConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}': {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error(
        "breaker.failure_window_secs ({window_secs}s) cannot hold {threshold} failures \
         one interval apart ({needed_secs}s); the breaker would never open"
    )]
    WindowTooShort {
        window_secs: u64,
        threshold: u32,
        needed_secs: u64,
    },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PollerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_url(&mut errors, "source.url", &config.source.url);
    check_url(&mut errors, "sink.url", &config.sink.url);

    if config.source.expected_mime_type.trim().is_empty() {
        errors.push(ValidationError::Empty {
            field: "source.expected_mime_type",
        });
    }

    let non_zero = [
        ("schedule.interval_secs", config.schedule.interval_secs),
        ("breaker.cooldown_secs", config.breaker.cooldown_secs),
        ("breaker.failure_threshold", config.breaker.failure_threshold as u64),
        ("breaker.max_trial_requests", config.breaker.max_trial_requests as u64),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("alert.timeout_secs", config.alert.timeout_secs),
    ];
    for (field, value) in non_zero {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    let breaker = &config.breaker;
    let needed_secs = config
        .schedule
        .interval_secs
        .saturating_mul(u64::from(breaker.failure_threshold.saturating_sub(1)));
    if breaker.failure_window_secs != 0 && breaker.failure_window_secs < needed_secs {
        errors.push(ValidationError::WindowTooShort {
            window_secs: breaker.failure_window_secs,
            threshold: breaker.failure_threshold,
            needed_secs,
        });
    }

    if config.alert.is_enabled() {
        if config.alert.channel.trim().is_empty() {
            errors.push(ValidationError::Empty {
                field: "alert.channel",
            });
        }
        check_url(&mut errors, "alert.api_url", &config.alert.api_url);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let reason = match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => return,
        Ok(url) => format!("unsupported scheme '{}'", url.scheme()),
        Err(e) => e.to_string(),
    };
    errors.push(ValidationError::InvalidUrl {
        field,
        value: value.to_string(),
        reason,
    });
}
