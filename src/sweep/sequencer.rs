use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    lookup::VehicleLookup,
    models::VehicleId,
    notify::Notifier,
    report::{format_failure, format_report, format_sweep_summary},
    utils::shutdown::Shutdown,
};

/// Outcome counters of one sequenced batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub checked: usize,
    pub failed: usize,
    pub rate_limited: usize,
    pub interrupted: bool,
}

/// Checks vehicles one after the other, with a cooldown between lookups.
///
/// Clones share the same gate, so at most one batch talks to the upstream
/// API at any time, whichever path started it.
#[derive(Clone)]
pub struct Sequencer {
    lookup: Arc<dyn VehicleLookup>,
    notifier: Arc<dyn Notifier>,
    gate: Arc<Mutex<()>>,
    shutdown: Shutdown,
    summary: bool,
}

impl Sequencer {
    pub fn new(
        lookup: Arc<dyn VehicleLookup>,
        notifier: Arc<dyn Notifier>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            lookup,
            notifier,
            gate: Arc::new(Mutex::new(())),
            shutdown,
            summary: false,
        }
    }

    /// Send a closing summary message after every batch
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }

    /// Check `vehicles` in order, sleeping `cooldown` before every vehicle
    /// but the first. Failures are reported to the operator and never stop
    /// the batch. A shutdown while waiting for the gate or during a cooldown
    /// ends the batch early, and no lookup starts after shutdown.
    pub async fn run(&self, vehicles: &[VehicleId], cooldown: Duration) -> SweepSummary {
        let mut shutdown = self.shutdown.clone();
        let mut summary = SweepSummary::default();

        let _guard = tokio::select! {
            guard = self.gate.lock() => guard,
            _ = shutdown.wait() => {
                warn!(count = vehicles.len(), "queued vehicle check cancelled by shutdown");
                summary.interrupted = true;
                return summary;
            }
        };

        info!(count = vehicles.len(), "starting vehicle check");

        for (i, vehicle) in vehicles.iter().enumerate() {
            if i > 0 {
                info!(
                    gap_secs = cooldown.as_secs(),
                    next = %vehicle,
                    "waiting before next vehicle"
                );
                tokio::select! {
                    _ = tokio::time::sleep(cooldown) => {}
                    _ = shutdown.wait() => {
                        warn!(remaining = vehicles.len() - i, "vehicle check interrupted by shutdown");
                        summary.interrupted = true;
                        break;
                    }
                }
            }

            if shutdown.is_triggered() {
                warn!(remaining = vehicles.len() - i, "vehicle check interrupted by shutdown");
                summary.interrupted = true;
                break;
            }

            self.check_one(vehicle, &mut summary).await;
        }

        info!(
            checked = summary.checked,
            failed = summary.failed,
            "vehicle check completed"
        );

        if self.summary {
            self.deliver(&format_sweep_summary(&summary), None).await;
        }

        summary
    }

    async fn check_one(&self, vehicle: &VehicleId, summary: &mut SweepSummary) {
        info!(registration = %vehicle, "checking vehicle");
        summary.checked += 1;

        let text = match self.lookup.check_vehicle(vehicle).await {
            Ok(data) => format_report(vehicle, &data),
            Err(e) => {
                error!(registration = %vehicle, "failed to check vehicle: {e}");
                summary.failed += 1;
                if e.is_rate_limited() {
                    summary.rate_limited += 1;
                }
                format_failure(vehicle, &e)
            }
        };

        self.deliver(&text, Some(vehicle)).await;
    }

    async fn deliver(&self, text: &str, vehicle: Option<&VehicleId>) {
        if let Err(e) = self.notifier.send(text).await {
            match vehicle {
                Some(vehicle) => {
                    error!(registration = %vehicle, "failed to send notification: {e}")
                }
                None => error!("failed to send notification: {e}"),
            }
        }
    }
}
