//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! scheduler / breaker / alerter
//!     → events.rs (PollerEvent through an injected EventSink)
//!     → TracingEventSink
//!         → logging.rs subscriber (structured log records)
//!         → metrics.rs (counters, gauges, histograms)
//! ```
//!
//! # Design Decisions
//! - Logging is a side channel: components emit events, never format logs
//! - Structured logging (JSON) for machine parsing
//! - Metrics are cheap (facade calls, no exporter by default)

pub mod events;
pub mod logging;
pub mod metrics;

pub use events::{EventSink, NoopEventSink, PollerEvent, TracingEventSink};
