//! Poll-and-forward building blocks.
//!
//! # Data Flow
//! ```text
//! fetcher.rs (GET source, check status + Content-Type)
//!     → PollResult
//!     → policy.rs (forward or skip)
//!     → forwarder.rs (POST sink, check status)
//! ```
//!
//! # Design Decisions
//! - Fetcher and Forwarder are traits so the scheduler can run against
//!   in-memory implementations
//! - One shared reqwest client (client.rs) carries the configured timeouts

pub mod client;
pub mod error;
pub mod fetcher;
pub mod forwarder;
pub mod policy;

pub use client::build_client;
pub use error::{FetchError, ForwardError, PollError};
pub use fetcher::{Fetcher, HttpFetcher, PollResult};
pub use forwarder::{Forwarder, HttpForwarder};
pub use policy::{AlwaysForward, ForwardPolicy, SkipEmpty};
