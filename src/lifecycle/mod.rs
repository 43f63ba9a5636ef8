//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → HTTP client → fetcher/forwarder/policy → breaker → alerter → scheduler
//!
//! Shutdown (shutdown.rs):
//!     Signal received → trigger → scheduler finishes or abandons its tick → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then client, then components
//! - No new tick starts once shutdown is triggered

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use signals::shutdown_signal;
pub use startup::{build_scheduler, StartupError};
