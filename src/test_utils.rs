use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use axum::Router;
use reqwest::StatusCode;
use tokio::{net::TcpListener, sync::Mutex, time::Instant};

use crate::{
    lookup::{LookupError, VehicleLookup},
    models::{LookupResponse, VehicleId},
    notify::{NotifyError, Notifier},
    telegram::TelegramError,
};

pub fn vehicles(raw: &[&str]) -> Vec<VehicleId> {
    raw.iter().map(|v| v.parse().unwrap()).collect()
}

/// Elapsed virtual time, allowing for the timer's millisecond rounding
pub fn assert_elapsed(actual: Duration, expected: Duration) {
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(10),
        "expected about {expected:?}, got {actual:?}"
    );
}

/// Serve `router` on an ephemeral local port, returns its base URL
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a local port nothing listens on
pub async fn unused_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

#[derive(Clone, Debug)]
pub enum MockOutcome {
    Found(LookupResponse),
    RateLimited,
    Status(u16),
}

impl MockOutcome {
    fn produce(&self) -> Result<LookupResponse, LookupError> {
        match self {
            MockOutcome::Found(data) => Ok(data.clone()),
            MockOutcome::RateLimited => Err(LookupError::RateLimited),
            MockOutcome::Status(code) => Err(LookupError::UnexpectedStatus(
                StatusCode::from_u16(*code).unwrap(),
            )),
        }
    }
}

/// Lookup double recording every call. Vehicles without a configured
/// outcome get a successful, empty response.
pub struct MockLookup {
    outcomes: HashMap<String, MockOutcome>,
    latency: Duration,
    calls: Mutex<Vec<(VehicleId, Instant)>>,
}

impl MockLookup {
    pub fn new() -> Self {
        Self {
            outcomes: HashMap::new(),
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_outcome(mut self, vehicle: &str, outcome: MockOutcome) -> Self {
        self.outcomes.insert(vehicle.to_string(), outcome);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub async fn calls(&self) -> Vec<(VehicleId, Instant)> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl VehicleLookup for MockLookup {
    async fn check_vehicle(&self, vehicle: &VehicleId) -> Result<LookupResponse, LookupError> {
        self.calls
            .lock()
            .await
            .push((vehicle.clone(), Instant::now()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.outcomes.get(vehicle.as_str()) {
            Some(outcome) => outcome.produce(),
            None => Ok(LookupResponse {
                status: "success".to_string(),
                ..Default::default()
            }),
        }
    }
}

/// Notifier double keeping delivered messages in order
pub struct RecordingNotifier {
    fail: bool,
    attempts: AtomicUsize,
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            fail: false,
            attempts: AtomicUsize::new(0),
            messages: Mutex::new(Vec::new()),
        }
    }

    /// A notifier whose every delivery fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn messages(&self) -> Vec<String> {
        self.messages.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TelegramError::Api {
                code: 403,
                description: "Forbidden: bot was blocked by the user".to_string(),
            }
            .into());
        }
        self.messages.lock().await.push(text.to_string());
        Ok(())
    }
}
