//! Drift-free periodic wait.
//!
//! Each wake is scheduled relative to the previous scheduled wake point, not
//! to the moment the caller asked to wait, so time spent working inside an
//! iteration does not push later wakes back. When an iteration overruns its
//! period the deadline is already in the past and the wait returns at once;
//! the accumulator still advances by exactly one period.

use embassy_time::{Duration, Instant, Timer};

#[derive(Debug, Default, Clone)]
pub struct PeriodicWait {
    next_wake: Option<Instant>,
}

impl PeriodicWait {
    pub const fn new() -> Self {
        Self { next_wake: None }
    }

    /// Compute the next deadline and advance the accumulator. The first call
    /// seeds the accumulator with `now`.
    pub fn schedule(&mut self, now: Instant, period: Duration) -> Instant {
        let base = *self.next_wake.get_or_insert(now);
        let deadline = base + period;
        self.next_wake = Some(deadline);
        deadline
    }

    /// Suspend until `period` after the previous scheduled wake. Returns the
    /// scheduled wake point this call waited for.
    pub async fn wait_until_next(&mut self, period: Duration) -> Instant {
        let deadline = self.schedule(Instant::now(), period);
        Timer::at(deadline).await;
        deadline
    }
}
