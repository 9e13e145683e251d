//! Daily sweep scheduling and sequential vehicle checks.

pub mod scheduler;
pub mod sequencer;

pub use scheduler::{DailySchedule, ScheduleError, SweepScheduler};
pub use sequencer::{Sequencer, SweepSummary};
