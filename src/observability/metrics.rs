//! Metrics collection.
//!
//! # Metrics
//! - `polldancer_ticks_total` (counter): ticks by outcome
//! - `polldancer_tick_duration_seconds` (histogram): wall time per tick
//! - `polldancer_breaker_state` (gauge): 0=closed, 1=open, 2=half-open
//! - `polldancer_breaker_transitions_total` (counter): transitions by target state
//! - `polldancer_alerts_total` (counter): alerts by result
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the poller installs no exporter
//!   and has no listener, so an embedding process chooses the recorder

use std::time::Duration;

use crate::resilience::CircuitState;
use crate::scheduler::TickOutcome;

pub fn record_tick(outcome: TickOutcome, elapsed: Duration) {
    metrics::counter!("polldancer_ticks_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("polldancer_tick_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_breaker_transition(to: CircuitState) {
    metrics::gauge!("polldancer_breaker_state").set(to as u8 as f64);
    metrics::counter!("polldancer_breaker_transitions_total", "to" => to.as_str()).increment(1);
}

pub fn record_alert(result: &'static str) {
    metrics::counter!("polldancer_alerts_total", "result" => result).increment(1);
}
