//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared HTTP client from the validated configuration
//! - Initialize components in dependency order
//! - Hand back a scheduler ready to run
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Components receive only their own config section

use std::sync::Arc;

use thiserror::Error;

use crate::alert::Alerter;
use crate::config::PollerConfig;
use crate::observability::EventSink;
use crate::poller::{self, HttpFetcher, HttpForwarder};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use crate::scheduler::{Pipeline, Scheduler};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Wire every component described by `config` into a scheduler.
pub fn build_scheduler(
    config: &PollerConfig,
    events: Arc<dyn EventSink>,
) -> Result<Scheduler, StartupError> {
    let client = poller::build_client(&config.timeouts)?;

    let pipeline = Pipeline {
        fetcher: Arc::new(HttpFetcher::new(client.clone(), &config.source)),
        policy: poller::policy::from_config(&config.policy),
        forwarder: Arc::new(HttpForwarder::new(client.clone(), &config.sink)),
    };

    let breaker = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig::from(&config.breaker),
        events.clone(),
    ));
    let alerter = Alerter::from_config(&config.alert, client, events.clone());

    tracing::info!(
        source = %config.source.url,
        sink = %config.sink.url,
        interval_secs = config.schedule.interval_secs,
        alerts_enabled = alerter.is_enabled(),
        "Poller initialized"
    );

    Ok(Scheduler::new(
        config.schedule.interval(),
        pipeline,
        breaker,
        alerter,
        events,
    ))
}
