//! polldancer
//!
//! Polls a source over HTTP on a fixed interval and forwards the payload to a
//! webhook, alerting an operator channel when a tick fails.
//!
//! # Architecture Overview
//!
//! ```text
//!   Source ◀── GET ──┐                              ┌── POST ──▶ Sink
//!                    │                              │
//!  ┌───────────┐   ┌─┴───────┐   ┌────────┐   ┌─────┴─────┐
//!  │  breaker  │──▶│ fetcher │──▶│ policy │──▶│ forwarder │
//!  └─────▲─────┘   └─────────┘   └────────┘   └───────────┘
//!        │ every interval
//!  ┌─────┴─────┐  on failure   ┌─────────┐
//!  │ scheduler │──────────────▶│ alerter │── POST ──▶ Slack
//!  └───────────┘               └─────────┘
//!
//!  Cross-cutting: config · observability events · lifecycle
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use polldancer::config;
use polldancer::lifecycle::{build_scheduler, shutdown_signal, Shutdown};
use polldancer::observability::{logging, EventSink, TracingEventSink};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match config::resolve_config() {
        Ok(config) => config,
        Err(e) => {
            // Logging is configured from the config, so report directly.
            eprintln!("polldancer: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Flushes the log file on drop; held until main returns.
    let _log_guard = match logging::init_logging(&config.observability) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("polldancer: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("polldancer v{} starting", env!("CARGO_PKG_VERSION"));

    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);
    let scheduler = match build_scheduler(&config, events) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let poller = tokio::spawn(scheduler.run(shutdown.subscribe()));

    shutdown_signal().await;
    shutdown.trigger();

    match poller.await {
        Ok(ticks) => tracing::info!(ticks, "Shutdown complete"),
        Err(e) => {
            tracing::error!(error = %e, "Poller task failed");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
