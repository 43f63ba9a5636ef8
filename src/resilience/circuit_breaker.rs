//! Circuit breaker guarding the per-tick unit of work.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: trial calls test whether the dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold, the streak spanning at most the window
//! Open → Half-Open: after cooldown
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (cooldown restarts)
//! ```
//!
//! # Design Decisions
//! - Fail fast in Open state (work is never invoked)
//! - Bounded number of trials in Half-Open (prevents hammering a recovering dependency)
//! - State lives behind a mutex so the breaker can be shared between callers
//! - Each state change bumps a generation; results from calls admitted under
//!   an older generation are not counted
//! - A trial dropped before it finishes gives its Half-Open slot back
//! - Transitions are reported through the injected `EventSink`

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::BreakerConfig;
use crate::observability::{EventSink, PollerEvent};

/// Breaker state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CircuitState {
    #[default]
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime breaker tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that trip the breaker.
    pub failure_threshold: u32,
    /// Longest a failure streak may span and still trip; zero disables it.
    pub failure_window: Duration,
    /// Time spent Open before trials are admitted.
    pub cooldown: Duration,
    /// Trial calls allowed in flight while Half-Open.
    pub max_trial_requests: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self::from(&BreakerConfig::default())
    }
}

impl From<&BreakerConfig> for CircuitBreakerConfig {
    fn from(config: &BreakerConfig) -> Self {
        Self {
            failure_threshold: config.failure_threshold.max(1),
            failure_window: Duration::from_secs(config.failure_window_secs),
            cooldown: Duration::from_secs(config.cooldown_secs),
            max_trial_requests: config.max_trial_requests.max(1),
        }
    }
}

/// Errors returned by [`CircuitBreaker::execute`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The breaker is Open; the work was not invoked.
    #[error("circuit breaker open, retry in {retry_in:?}")]
    Open { retry_in: Duration },

    /// The breaker is Half-Open and every trial slot is taken.
    #[error("circuit breaker half-open, all {limit} trial requests in flight")]
    TooManyTrials { limit: u32 },

    /// The work ran and failed.
    #[error("{0}")]
    Inner(E),
}

impl<E> BreakerError<E> {
    /// True when the breaker refused to run the work.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, BreakerError::Inner(_))
    }

    pub fn into_inner(self) -> Option<E> {
        match self {
            BreakerError::Inner(e) => Some(e),
            _ => None,
        }
    }
}

/// Point-in-time view of the breaker counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakerCounts {
    pub consecutive_failures: u32,
    pub successes: u64,
    pub failures: u64,
    pub rejections: u64,
}

type Transition = (CircuitState, CircuitState);

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    generation: u64,
    streak_started_at: Instant,
    opened_at: Instant,
    trials_in_flight: u32,
    counts: BreakerCounts,
}

impl BreakerInner {
    fn transition(&mut self, to: CircuitState, now: Instant) -> Transition {
        let from = self.state;
        self.state = to;
        self.generation += 1;
        self.trials_in_flight = 0;
        match to {
            CircuitState::Closed => self.counts.consecutive_failures = 0,
            CircuitState::Open => self.opened_at = now,
            CircuitState::HalfOpen => {}
        }
        (from, to)
    }

    /// Count one Closed-state failure, restarting the streak when it has
    /// outlived the window.
    fn count_failure(&mut self, window: Duration, now: Instant) {
        let expired = !window.is_zero() && now.duration_since(self.streak_started_at) > window;
        if self.counts.consecutive_failures == 0 || expired {
            self.counts.consecutive_failures = 0;
            self.streak_started_at = now;
        }
        self.counts.consecutive_failures += 1;
    }
}

/// Ticket for an admitted call.
#[derive(Debug, Clone, Copy)]
struct Admission {
    generation: u64,
    trial: bool,
}

/// Holds a Half-Open trial slot until the call's result is recorded.
struct TrialSlot<'a> {
    breaker: &'a CircuitBreaker,
    admission: Admission,
    recorded: bool,
}

impl Drop for TrialSlot<'_> {
    fn drop(&mut self) {
        if self.admission.trial && !self.recorded {
            self.breaker.release_trial(self.admission.generation);
        }
    }
}

/// Three-state circuit breaker.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
    events: Arc<dyn EventSink>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig, events: Arc<dyn EventSink>) -> Self {
        let now = Instant::now();
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                generation: 0,
                streak_started_at: now,
                opened_at: now,
                trials_in_flight: 0,
                counts: BreakerCounts::default(),
            }),
            events,
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state as last recorded.
    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn counts(&self) -> BreakerCounts {
        self.lock().counts
    }

    /// Run `work` unless the breaker rejects it, recording the result.
    ///
    /// Any `Err` from the work counts as a failure, any `Ok` as a success.
    pub async fn execute<F, Fut, T, E>(&self, work: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let admission = self.admit()?;
        let mut slot = TrialSlot {
            breaker: self,
            admission,
            recorded: false,
        };

        let result = work().await;
        slot.recorded = true;
        self.record(admission.generation, result.is_ok());
        result.map_err(BreakerError::Inner)
    }

    fn admit<E>(&self) -> Result<Admission, BreakerError<E>> {
        let now = Instant::now();
        let mut transition = None;

        let admitted = {
            let mut inner = self.lock();

            if inner.state == CircuitState::Open
                && now.duration_since(inner.opened_at) >= self.config.cooldown
            {
                transition = Some(inner.transition(CircuitState::HalfOpen, now));
            }

            match inner.state {
                CircuitState::Closed => Ok(Admission {
                    generation: inner.generation,
                    trial: false,
                }),
                CircuitState::Open => {
                    inner.counts.rejections += 1;
                    let elapsed = now.duration_since(inner.opened_at);
                    Err(BreakerError::Open {
                        retry_in: self.config.cooldown.saturating_sub(elapsed),
                    })
                }
                CircuitState::HalfOpen => {
                    if inner.trials_in_flight < self.config.max_trial_requests {
                        inner.trials_in_flight += 1;
                        Ok(Admission {
                            generation: inner.generation,
                            trial: true,
                        })
                    } else {
                        inner.counts.rejections += 1;
                        Err(BreakerError::TooManyTrials {
                            limit: self.config.max_trial_requests,
                        })
                    }
                }
            }
        };

        self.publish(transition);
        admitted
    }

    fn record(&self, generation: u64, success: bool) {
        let now = Instant::now();
        let mut transition = None;

        {
            let mut inner = self.lock();
            if success {
                inner.counts.successes += 1;
            } else {
                inner.counts.failures += 1;
            }

            if inner.generation == generation {
                match (inner.state, success) {
                    (CircuitState::Closed, true) => inner.counts.consecutive_failures = 0,
                    (CircuitState::Closed, false) => {
                        inner.count_failure(self.config.failure_window, now);
                        if inner.counts.consecutive_failures >= self.config.failure_threshold {
                            transition = Some(inner.transition(CircuitState::Open, now));
                        }
                    }
                    (CircuitState::HalfOpen, true) => {
                        transition = Some(inner.transition(CircuitState::Closed, now));
                    }
                    (CircuitState::HalfOpen, false) => {
                        inner.counts.consecutive_failures += 1;
                        transition = Some(inner.transition(CircuitState::Open, now));
                    }
                    // Open bumps the generation, so no admitted call can land here.
                    (CircuitState::Open, _) => {}
                }
            }
        }

        self.publish(transition);
    }

    fn release_trial(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation == generation && inner.state == CircuitState::HalfOpen {
            inner.trials_in_flight = inner.trials_in_flight.saturating_sub(1);
        }
    }

    fn publish(&self, transition: Option<Transition>) {
        if let Some((from, to)) = transition {
            self.events.emit(PollerEvent::BreakerTransition { from, to });
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("CircuitBreaker")
            .field("state", &inner.state)
            .field("counts", &inner.counts)
            .field("config", &self.config)
            .finish()
    }
}
