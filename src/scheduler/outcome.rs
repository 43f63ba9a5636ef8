use std::fmt;

/// Result of one scheduled tick. Used for logs, metrics and alerts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// Payload fetched and forwarded.
    Success,
    /// Payload fetched, policy declined to forward it.
    PolicySkip,
    FetchError,
    ForwardError,
    /// The breaker refused to run the tick.
    BreakerOpen,
}

impl TickOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickOutcome::Success => "success",
            TickOutcome::PolicySkip => "policy_skip",
            TickOutcome::FetchError => "fetch_error",
            TickOutcome::ForwardError => "forward_error",
            TickOutcome::BreakerOpen => "breaker_open",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, TickOutcome::Success | TickOutcome::PolicySkip)
    }
}

impl fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
