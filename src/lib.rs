//! Periodic HTTP poller with circuit-breaker failure isolation.

pub mod alert;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod poller;
pub mod resilience;
pub mod scheduler;

pub use config::schema::PollerConfig;
pub use lifecycle::Shutdown;
pub use scheduler::{Scheduler, TickOutcome};
