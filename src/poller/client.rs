//! Shared outbound HTTP client.

use std::time::Duration;

use crate::config::TimeoutConfig;

const USER_AGENT: &str = concat!("polldancer/", env!("CARGO_PKG_VERSION"));

/// Build the client used for fetch, forward and alert calls.
pub fn build_client(timeouts: &TimeoutConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .build()
}
