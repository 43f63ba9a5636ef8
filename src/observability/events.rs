//! Structured poller events.
//!
//! Components never log domain events directly. They emit a [`PollerEvent`]
//! to the [`EventSink`] they were constructed with; the sink decides whether
//! the event becomes a log record, a metric, or both.

use std::time::Duration;

use crate::observability::metrics;
use crate::resilience::CircuitState;
use crate::scheduler::TickOutcome;

/// Everything observable about a running poller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerEvent {
    SchedulerStarted {
        interval: Duration,
    },
    SchedulerStopped {
        ticks: u64,
    },
    TickStarted {
        tick: u64,
    },
    TickFinished {
        tick: u64,
        outcome: TickOutcome,
        elapsed: Duration,
        /// Rendered error for failed ticks.
        error: Option<String>,
    },
    BreakerTransition {
        from: CircuitState,
        to: CircuitState,
    },
    AlertDelivered {
        sink: &'static str,
    },
    AlertFailed {
        sink: &'static str,
        error: String,
    },
    /// No alert transport configured; the message was dropped.
    AlertSkipped,
}

/// Receiver of poller events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PollerEvent);
}

/// Default sink: structured `tracing` records plus metric updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: PollerEvent) {
        match event {
            PollerEvent::SchedulerStarted { interval } => {
                tracing::info!(
                    module = "polling",
                    interval_ms = interval.as_millis() as u64,
                    "Polling started"
                );
            }
            PollerEvent::SchedulerStopped { ticks } => {
                tracing::debug!(module = "polling", ticks, "Polling cancelled");
            }
            PollerEvent::TickStarted { tick } => {
                tracing::trace!(module = "polling", tick, "Tick started");
            }
            PollerEvent::TickFinished {
                tick,
                outcome,
                elapsed,
                error,
            } => {
                metrics::record_tick(outcome, elapsed);
                match error {
                    Some(error) => tracing::error!(
                        module = "main",
                        tick,
                        outcome = outcome.as_str(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %error,
                        "Error in poll and forward"
                    ),
                    None => tracing::debug!(
                        module = "main",
                        tick,
                        outcome = outcome.as_str(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Tick completed"
                    ),
                }
            }
            PollerEvent::BreakerTransition { from, to } => {
                metrics::record_breaker_transition(to);
                tracing::warn!(
                    module = "breaker",
                    from = from.as_str(),
                    to = to.as_str(),
                    "Circuit breaker state changed"
                );
            }
            PollerEvent::AlertDelivered { sink } => {
                metrics::record_alert("delivered");
                tracing::debug!(module = "alert", sink, "Alert delivered");
            }
            PollerEvent::AlertFailed { sink, error } => {
                metrics::record_alert("failed");
                tracing::warn!(module = "alert", sink, error = %error, "Alert delivery failed");
            }
            PollerEvent::AlertSkipped => {
                metrics::record_alert("skipped");
                tracing::debug!(module = "alert", "Alerting disabled, message dropped");
            }
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: PollerEvent) {}
}
