//! Periodic poll-and-forward loop.
//!
//! # Responsibilities
//! - Fire one tick per interval until shutdown
//! - Run each tick's fetch → policy → forward inside the circuit breaker
//! - Turn every failed tick into exactly one alert
//!
//! # State Machine
//! ```text
//! Idle → Waiting-For-Tick → Running-Tick → Waiting-For-Tick → … → Cancelled
//! ```
//!
//! # Design Decisions
//! - Ticks are strictly sequential; a slow tick delays the next one
//!   (`MissedTickBehavior::Delay`), it never overlaps or bursts
//! - The first tick fires one interval after start
//! - Shutdown is observed while waiting and while a tick is in flight;
//!   an abandoned tick records nothing
//! - A failed tick is never fatal

mod outcome;

pub use outcome::TickOutcome;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};

use crate::alert::Alerter;
use crate::lifecycle::ShutdownSignal;
use crate::observability::{EventSink, PollerEvent};
use crate::poller::{Fetcher, ForwardPolicy, Forwarder, PollError};
use crate::resilience::{BreakerError, CircuitBreaker};

/// The collaborators that make up one unit of work.
#[derive(Clone)]
pub struct Pipeline {
    pub fetcher: Arc<dyn Fetcher>,
    pub policy: Arc<dyn ForwardPolicy>,
    pub forwarder: Arc<dyn Forwarder>,
}

/// What a successful unit of work did with the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Forwarded,
    Skipped,
}

pub struct Scheduler {
    interval: Duration,
    pipeline: Pipeline,
    breaker: Arc<CircuitBreaker>,
    alerter: Alerter,
    events: Arc<dyn EventSink>,
}

impl Scheduler {
    pub fn new(
        interval: Duration,
        pipeline: Pipeline,
        breaker: Arc<CircuitBreaker>,
        alerter: Alerter,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            interval,
            pipeline,
            breaker,
            alerter,
            events,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Tick until `shutdown` fires. Returns the number of ticks started.
    pub async fn run(self, mut shutdown: ShutdownSignal) -> u64 {
        self.events.emit(PollerEvent::SchedulerStarted {
            interval: self.interval,
        });

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = ticker.tick() => {}
            }

            ticks += 1;
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                _ = self.run_tick(ticks) => {}
            }
        }

        self.events.emit(PollerEvent::SchedulerStopped { ticks });
        ticks
    }

    /// Run one guarded unit of work outside the timer.
    pub async fn tick(&self) -> TickOutcome {
        self.run_tick(0).await
    }

    async fn run_tick(&self, tick: u64) -> TickOutcome {
        self.events.emit(PollerEvent::TickStarted { tick });
        let started = Instant::now();

        let result = self.breaker.execute(|| self.poll_and_forward()).await;
        let outcome = TickOutcome::from_result(&result);
        let error = result.err().map(|e| e.to_string());

        self.events.emit(PollerEvent::TickFinished {
            tick,
            outcome,
            elapsed: started.elapsed(),
            error: error.clone(),
        });

        if let Some(error) = error {
            self.alerter
                .notify(&format!("Error in poll and forward: {}", error))
                .await;
        }
        outcome
    }

    async fn poll_and_forward(&self) -> Result<Delivery, PollError> {
        let polled = self.pipeline.fetcher.poll().await?;

        if !self.pipeline.policy.should_forward(&polled.body) {
            return Ok(Delivery::Skipped);
        }

        self.pipeline
            .forwarder
            .send(&polled.body, &polled.content_type)
            .await?;
        Ok(Delivery::Forwarded)
    }
}

impl TickOutcome {
    fn from_result(result: &Result<Delivery, BreakerError<PollError>>) -> Self {
        match result {
            Ok(Delivery::Forwarded) => TickOutcome::Success,
            Ok(Delivery::Skipped) => TickOutcome::PolicySkip,
            Err(BreakerError::Open { .. } | BreakerError::TooManyTrials { .. }) => {
                TickOutcome::BreakerOpen
            }
            Err(BreakerError::Inner(PollError::Fetch(_))) => TickOutcome::FetchError,
            Err(BreakerError::Inner(PollError::Forward(_))) => TickOutcome::ForwardError,
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("interval", &self.interval)
            .field("breaker", &self.breaker)
            .field("alerter", &self.alerter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::alert::{AlertError, AlertSink};
    use crate::lifecycle::Shutdown;
    use crate::observability::NoopEventSink;
    use crate::poller::{AlwaysForward, FetchError, ForwardError, PollResult};
    use crate::resilience::{CircuitBreakerConfig, CircuitState};

    const INTERVAL: Duration = Duration::from_secs(1);

    #[derive(Default)]
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<PollResult, FetchError>>>,
        delay: Duration,
        calls: AtomicU32,
        in_flight: AtomicU32,
        max_in_flight: AtomicU32,
    }

    impl ScriptedFetcher {
        fn with_script(script: Vec<Result<PollResult, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }
    }

    fn json(body: &str) -> Result<PollResult, FetchError> {
        Ok(PollResult {
            body: body.as_bytes().to_vec(),
            content_type: "application/json".to_string(),
        })
    }

    fn server_error() -> Result<PollResult, FetchError> {
        Err(FetchError::Status {
            url: "http://source.local".to_string(),
            status: 500,
            body: "Internal Server Error".to_string(),
        })
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn poll(&self) -> Result<PollResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if !self.delay.is_zero() {
                time::sleep(self.delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            next.unwrap_or_else(|| json(r#"{"json":"ok"}"#))
        }
    }

    #[derive(Default)]
    struct RecordingForwarder {
        sent: Mutex<Vec<(Vec<u8>, String)>>,
    }

    #[async_trait]
    impl Forwarder for RecordingForwarder {
        async fn send(&self, payload: &[u8], mime_type: &str) -> Result<(), ForwardError> {
            self.sent
                .lock()
                .unwrap()
                .push((payload.to_vec(), mime_type.to_string()));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingAlerts(Mutex<Vec<String>>);

    #[async_trait]
    impl AlertSink for RecordingAlerts {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn deliver(&self, message: &str) -> Result<(), AlertError> {
            self.0.lock().unwrap().push(message.to_string());
            Ok(())
        }
    }

    struct Harness {
        fetcher: Arc<ScriptedFetcher>,
        forwarder: Arc<RecordingForwarder>,
        alerts: Arc<RecordingAlerts>,
        scheduler: Scheduler,
    }

    fn harness(fetcher: ScriptedFetcher, policy: Arc<dyn ForwardPolicy>, threshold: u32) -> Harness {
        let fetcher = Arc::new(fetcher);
        let forwarder = Arc::new(RecordingForwarder::default());
        let alerts = Arc::new(RecordingAlerts::default());
        let events: Arc<dyn EventSink> = Arc::new(NoopEventSink);

        let breaker = Arc::new(CircuitBreaker::new(
            CircuitBreakerConfig {
                failure_threshold: threshold,
                failure_window: Duration::ZERO,
                cooldown: Duration::from_secs(60),
                max_trial_requests: 1,
            },
            events.clone(),
        ));
        let alerter = Alerter::new(alerts.clone(), Duration::from_secs(5), events.clone());
        let pipeline = Pipeline {
            fetcher: fetcher.clone(),
            policy,
            forwarder: forwarder.clone(),
        };

        Harness {
            fetcher,
            forwarder,
            alerts,
            scheduler: Scheduler::new(INTERVAL, pipeline, breaker, alerter, events),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_tick_does_nothing() {
        let h = harness(ScriptedFetcher::default(), Arc::new(AlwaysForward), 5);
        let shutdown = Shutdown::new();
        shutdown.trigger();

        let ticks = h.scheduler.run(shutdown.subscribe()).await;

        assert_eq!(ticks, 0);
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
        assert!(h.forwarder.sent.lock().unwrap().is_empty());
        assert!(h.alerts.0.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval_until_shutdown() {
        let h = harness(ScriptedFetcher::default(), Arc::new(AlwaysForward), 5);
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(h.scheduler.run(shutdown.subscribe()));

        time::sleep(INTERVAL * 3 + INTERVAL / 2).await;
        shutdown.trigger();

        assert_eq!(handle.await.unwrap(), 3);
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 3);
        let sent = h.forwarder.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], (br#"{"json":"ok"}"#.to_vec(), "application/json".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_tick_delays_instead_of_overlapping() {
        let fetcher = ScriptedFetcher {
            delay: Duration::from_millis(2500),
            ..ScriptedFetcher::default()
        };
        let h = harness(fetcher, Arc::new(AlwaysForward), 5);
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(h.scheduler.run(shutdown.subscribe()));

        // Tick 1 runs 1.0s..3.5s, tick 2 starts late at 3.5s and is
        // abandoned mid-flight at 5s.
        time::sleep(Duration::from_secs(5)).await;
        shutdown.trigger();

        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(h.fetcher.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(h.forwarder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ticks_alert_and_loop_continues() {
        let fetcher = ScriptedFetcher::with_script(vec![server_error(), server_error()]);
        let h = harness(fetcher, Arc::new(AlwaysForward), 5);
        let shutdown = Shutdown::new();
        let handle = tokio::spawn(h.scheduler.run(shutdown.subscribe()));

        time::sleep(INTERVAL * 3 + INTERVAL / 2).await;
        shutdown.trigger();

        assert_eq!(handle.await.unwrap(), 3);
        let alerts = h.alerts.0.lock().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].starts_with("Error in poll and forward: "));
        assert!(alerts[0].contains("500"));
        assert_eq!(h.forwarder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_policy_rejection_never_forwards() {
        let policy: Arc<dyn ForwardPolicy> = Arc::new(|_: &[u8]| false);
        let h = harness(ScriptedFetcher::default(), policy, 5);

        assert_eq!(h.scheduler.tick().await, TickOutcome::PolicySkip);
        assert_eq!(h.scheduler.tick().await, TickOutcome::PolicySkip);

        assert!(h.forwarder.sent.lock().unwrap().is_empty());
        assert!(h.alerts.0.lock().unwrap().is_empty());
        assert_eq!(h.scheduler.breaker().counts().successes, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_short_circuits_tick() {
        let fetcher = ScriptedFetcher::with_script(vec![server_error()]);
        let h = harness(fetcher, Arc::new(AlwaysForward), 1);

        assert_eq!(h.scheduler.tick().await, TickOutcome::FetchError);
        assert_eq!(h.scheduler.tick().await, TickOutcome::BreakerOpen);

        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
        let alerts = h.alerts.0.lock().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[1].contains("circuit breaker open"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_tick_after_cooldown_closes_breaker() {
        let fetcher = ScriptedFetcher::with_script(vec![server_error()]);
        let h = harness(fetcher, Arc::new(AlwaysForward), 1);
        let breaker = h.scheduler.breaker().clone();

        assert_eq!(h.scheduler.tick().await, TickOutcome::FetchError);
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(h.scheduler.tick().await, TickOutcome::BreakerOpen);

        time::advance(breaker.config().cooldown).await;
        assert_eq!(h.scheduler.tick().await, TickOutcome::Success);

        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.counts().consecutive_failures, 0);
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.forwarder.sent.lock().unwrap().len(), 1);
        assert_eq!(h.alerts.0.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_beyond_trial_limit_counts_as_breaker_open() {
        let fetcher = ScriptedFetcher {
            delay: Duration::from_secs(10),
            ..ScriptedFetcher::with_script(vec![server_error()])
        };
        let h = harness(fetcher, Arc::new(AlwaysForward), 1);

        assert_eq!(h.scheduler.tick().await, TickOutcome::FetchError);
        time::advance(h.scheduler.breaker().config().cooldown).await;

        // The first tick holds the only trial slot while the second arrives.
        let (trial, extra) = tokio::join!(h.scheduler.tick(), async {
            tokio::task::yield_now().await;
            h.scheduler.tick().await
        });

        assert_eq!(trial, TickOutcome::Success);
        assert_eq!(extra, TickOutcome::BreakerOpen);
        assert_eq!(h.scheduler.breaker().state(), CircuitState::Closed);
        assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 2);

        let alerts = h.alerts.0.lock().unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts[1].starts_with("Error in poll and forward: circuit breaker half-open"));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(TickOutcome::BreakerOpen.to_string(), "breaker_open");
        assert!(TickOutcome::ForwardError.is_failure());
        assert!(!TickOutcome::PolicySkip.is_failure());
    }
}
