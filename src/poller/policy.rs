//! Forwarding policies.

use std::sync::Arc;

use crate::config::PolicyConfig;

/// Decides whether a fetched payload is worth forwarding.
///
/// Implementations must be pure: the same payload always yields the same
/// answer and nothing is mutated.
pub trait ForwardPolicy: Send + Sync {
    fn should_forward(&self, payload: &[u8]) -> bool;
}

impl<F> ForwardPolicy for F
where
    F: Fn(&[u8]) -> bool + Send + Sync,
{
    fn should_forward(&self, payload: &[u8]) -> bool {
        self(payload)
    }
}

/// Forwards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysForward;

impl ForwardPolicy for AlwaysForward {
    fn should_forward(&self, _payload: &[u8]) -> bool {
        true
    }
}

/// Forwards only non-empty payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipEmpty;

impl ForwardPolicy for SkipEmpty {
    fn should_forward(&self, payload: &[u8]) -> bool {
        !payload.is_empty()
    }
}

/// Policy selected by configuration.
pub fn from_config(config: &PolicyConfig) -> Arc<dyn ForwardPolicy> {
    if config.skip_empty_payloads {
        Arc::new(SkipEmpty)
    } else {
        Arc::new(AlwaysForward)
    }
}
