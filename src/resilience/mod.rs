//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Scheduler tick:
//!     → circuit_breaker.rs (admit or reject)
//!     → unit of work (fetch → policy → forward)
//!     → circuit_breaker.rs (record success/failure, maybe transition)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every outbound call has a client deadline
//! - No retries inside a tick; repeated failure is handled by the breaker cooldown
//! - Circuit breaker prevents hammering an unhealthy upstream or downstream

pub mod circuit_breaker;

pub use circuit_breaker::{
    BreakerCounts, BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState,
};
