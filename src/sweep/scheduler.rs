use std::{str::FromStr, time::Duration};

use chrono::{DateTime, FixedOffset, Utc};
use cron::Schedule;
use thiserror::Error;
use tracing::{info, warn};

use crate::{models::VehicleId, utils::shutdown::Shutdown};

use super::Sequencer;

/// 18:00 every day
pub const DEFAULT_CRON: &str = "0 0 18 * * *";
/// East Africa Time, UTC+03:00 without daylight saving
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 3 * 60 * 60;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid cron expression: {0}")]
    Cron(#[from] cron::error::Error),
    #[error("UTC offset out of range: {0}s")]
    Offset(i32),
}

/// Daily trigger time in a fixed civil-time offset
#[derive(Clone, Debug)]
pub struct DailySchedule {
    cron: Schedule,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(expression: &str, utc_offset_secs: i32) -> Result<Self, ScheduleError> {
        let cron = Schedule::from_str(expression)?;
        let offset =
            FixedOffset::east_opt(utc_offset_secs).ok_or(ScheduleError::Offset(utc_offset_secs))?;
        Ok(Self { cron, offset })
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// First trigger strictly after `now`. A trigger that already passed
    /// today rolls over to the next calendar day.
    pub fn next_trigger(&self, now: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        self.cron.after(&now.with_timezone(&self.offset)).next()
    }
}

/// Runs the full vehicle sweep once per scheduled trigger, until shutdown
pub struct SweepScheduler {
    schedule: DailySchedule,
    sequencer: Sequencer,
    vehicles: Vec<VehicleId>,
    cooldown: Duration,
    shutdown: Shutdown,
}

impl SweepScheduler {
    pub fn new(
        schedule: DailySchedule,
        sequencer: Sequencer,
        vehicles: Vec<VehicleId>,
        cooldown: Duration,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            schedule,
            sequencer,
            vehicles,
            cooldown,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        info!(
            vehicles = ?self.vehicles.iter().map(VehicleId::as_str).collect::<Vec<_>>(),
            "scheduler started"
        );

        loop {
            let now = self.schedule.now();
            let Some(next) = self.schedule.next_trigger(now) else {
                warn!("schedule has no upcoming trigger, scheduler stopping");
                return;
            };
            let wait = (next - now).to_std().unwrap_or_default();
            info!(
                at = %next.format("%Y-%m-%d %H:%M:%S %:z"),
                in_secs = wait.as_secs(),
                "next scheduled run"
            );

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.shutdown.wait() => {
                    info!("scheduler shutting down");
                    return;
                }
            }

            info!(count = self.vehicles.len(), "starting daily vehicle check");
            let summary = self.sequencer.run(&self.vehicles, self.cooldown).await;
            if summary.interrupted {
                info!("scheduler shutting down");
                return;
            }
        }
    }
}
