//! Daily reset scheduling.
//!
//! # Responsibility
//! - Compute the next local-midnight boundary from "now".
//! - Drive the `idle -> firing -> idle` reset state machine.
//! - Run the reset loop on a tokio runtime for hosts that have one.
//!
//! # Invariants
//! - The next fire time is always recomputed from the clock after a fire,
//!   never derived by adding a fixed 24h interval.
//! - Missed midnights are not backfilled; at most one reset runs per wake-up.

mod midnight;
mod scheduler;
mod timer;

pub use midnight::next_midnight_after;
pub use scheduler::{DailyResetHandle, DailyResetScheduler, RESET_POLL_INTERVAL};
pub use timer::{DailyResetTimer, ResetTimerState};

use chrono::{DateTime, Local, TimeZone};

/// Source of wall-clock time for the reset timer.
pub trait Clock {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Host wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
