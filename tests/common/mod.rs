//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use polldancer::alert::{AlertError, AlertSink, Alerter};
use polldancer::config::{SinkConfig, SourceConfig, TimeoutConfig};
use polldancer::observability::{EventSink, PollerEvent};
use polldancer::poller::{self, AlwaysForward, ForwardPolicy, HttpFetcher, HttpForwarder};
use polldancer::resilience::{CircuitBreaker, CircuitBreakerConfig};
use polldancer::scheduler::{Pipeline, Scheduler};

/// Alert transport that keeps every message.
#[derive(Default)]
pub struct RecordingAlertSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlertSink {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingAlertSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, message: &str) -> Result<(), AlertError> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Event sink that keeps every event.
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<PollerEvent>>,
}

impl RecordingEvents {
    pub fn events(&self) -> Vec<PollerEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: PollerEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// A scheduler wired against real HTTP endpoints with recording side channels.
pub struct TestPoller {
    pub scheduler: Scheduler,
    pub breaker: Arc<CircuitBreaker>,
    pub alerts: Arc<RecordingAlertSink>,
    pub events: Arc<RecordingEvents>,
}

pub fn source_config(url: String) -> SourceConfig {
    SourceConfig {
        url,
        expected_mime_type: "application/json".to_string(),
    }
}

pub fn client() -> reqwest::Client {
    poller::build_client(&TimeoutConfig {
        connect_secs: 2,
        request_secs: 5,
    })
    .unwrap()
}

pub fn test_poller(source_url: String, sink_url: String, failure_threshold: u32) -> TestPoller {
    test_poller_with_policy(source_url, sink_url, failure_threshold, Arc::new(AlwaysForward))
}

pub fn test_poller_with_policy(
    source_url: String,
    sink_url: String,
    failure_threshold: u32,
    policy: Arc<dyn ForwardPolicy>,
) -> TestPoller {
    let client = client();
    let events = Arc::new(RecordingEvents::default());
    let alerts = Arc::new(RecordingAlertSink::default());

    let breaker = Arc::new(CircuitBreaker::new(
        CircuitBreakerConfig {
            failure_threshold,
            failure_window: Duration::ZERO,
            cooldown: Duration::from_secs(60),
            max_trial_requests: 1,
        },
        events.clone(),
    ));
    let pipeline = Pipeline {
        fetcher: Arc::new(HttpFetcher::new(client.clone(), &source_config(source_url))),
        policy,
        forwarder: Arc::new(HttpForwarder::new(client, &SinkConfig { url: sink_url })),
    };
    let alerter = Alerter::new(alerts.clone(), Duration::from_secs(5), events.clone());

    TestPoller {
        scheduler: Scheduler::new(
            Duration::from_millis(100),
            pipeline,
            breaker.clone(),
            alerter,
            events.clone(),
        ),
        breaker,
        alerts,
        events,
    }
}
