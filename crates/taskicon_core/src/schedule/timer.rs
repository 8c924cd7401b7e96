use super::{next_midnight_after, Clock};
use crate::storage::TaskStorage;
use crate::store::TaskStore;
use chrono::{DateTime, Utc};
use log::info;
use std::time::Duration;

/// Reset timer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTimerState {
    /// Armed for the next local midnight.
    Idle { next_fire: DateTime<Utc> },
    /// Reset pass in progress. Only set inside `fire`, which re-arms before
    /// returning, so callers holding `&self` always see `Idle`.
    Firing,
}

/// Midnight reset state machine driven by an injectable clock.
///
/// The timer does not sleep by itself; hosts either poll `fire_if_due` from
/// their own timer primitive or hand it to `DailyResetScheduler`.
#[derive(Debug)]
pub struct DailyResetTimer<C: Clock> {
    clock: C,
    state: ResetTimerState,
    last_fired: Option<DateTime<Utc>>,
}

impl<C: Clock> DailyResetTimer<C> {
    /// Creates a timer armed for the midnight following the clock's "now".
    pub fn new(clock: C) -> Self {
        let next_fire = Self::compute_next_fire(&clock);
        info!(
            "event=reset_timer_arm module=schedule status=ok next_fire={}",
            next_fire.to_rfc3339()
        );
        Self {
            clock,
            state: ResetTimerState::Idle { next_fire },
            last_fired: None,
        }
    }

    pub fn state(&self) -> ResetTimerState {
        self.state
    }

    /// Clock reading at the most recent reset pass, if any.
    pub fn last_fired(&self) -> Option<DateTime<Utc>> {
        self.last_fired
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn next_fire(&self) -> Option<DateTime<Utc>> {
        match self.state {
            ResetTimerState::Idle { next_fire } => Some(next_fire),
            ResetTimerState::Firing => None,
        }
    }

    /// Wall-clock time left until the armed fire; zero when already due.
    pub fn until_next_fire(&self) -> Duration {
        let Some(next_fire) = self.next_fire() else {
            return Duration::ZERO;
        };
        let now = self.clock.now().with_timezone(&Utc);
        (next_fire - now).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_due(&self) -> bool {
        match self.next_fire() {
            Some(next_fire) => self.clock.now().with_timezone(&Utc) >= next_fire,
            None => false,
        }
    }

    /// Runs the reset pass on `store` and re-arms for the next midnight.
    pub fn fire<S: TaskStorage>(&mut self, store: &mut TaskStore<S>) {
        self.state = ResetTimerState::Firing;
        let fired_at = self.clock.now().with_timezone(&Utc);
        let reset = store.apply_daily_reset();
        self.last_fired = Some(fired_at);
        info!(
            "event=reset_timer_fire module=schedule status=ok fired_at={} reset={}",
            fired_at.to_rfc3339(),
            reset
        );
        self.rearm();
    }

    /// Fires only when the armed midnight has passed. Returns whether it fired.
    pub fn fire_if_due<S: TaskStorage>(&mut self, store: &mut TaskStore<S>) -> bool {
        if !self.is_due() {
            return false;
        }
        self.fire(store);
        true
    }

    fn rearm(&mut self) {
        let next_fire = Self::compute_next_fire(&self.clock);
        self.state = ResetTimerState::Idle { next_fire };
        info!(
            "event=reset_timer_arm module=schedule status=ok next_fire={}",
            next_fire.to_rfc3339()
        );
    }

    fn compute_next_fire(clock: &C) -> DateTime<Utc> {
        next_midnight_after(&clock.now()).with_timezone(&Utc)
    }
}
