//! Sleep-based frame pacing.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::FleetResult;
use crate::sync::CancelHandle;

/// Keeps a loop on a fixed period.
///
/// Deadlines advance by exactly one period per wait, so time spent
/// sending does not accumulate as drift. A loop that falls behind
/// resynchronizes to "now" instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct Pacer {
    period: Duration,
    next: Instant,
}

impl Pacer {
    /// First deadline is one period from now.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next: Instant::now() + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Wait for the next deadline.
    ///
    /// Cancellation is checked once, before sleeping. A cancel raised while
    /// asleep is seen at the following boundary.
    pub fn wait(&mut self, cancel: &CancelHandle) -> FleetResult<()> {
        cancel.check()?;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
            self.next += self.period;
        } else {
            self.next = now + self.period;
        }
        Ok(())
    }
}

/// One-off cancellable pause.
pub fn pause(duration: Duration, cancel: &CancelHandle) -> FleetResult<()> {
    cancel.check()?;
    if !duration.is_zero() {
        thread::sleep(duration);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FleetError;

    #[test]
    fn test_pacer_keeps_period() {
        let cancel = CancelHandle::new();
        let start = Instant::now();
        let mut pacer = Pacer::new(Duration::from_millis(5));
        for _ in 0..4 {
            pacer.wait(&cancel).unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_pacer_resyncs_when_behind() {
        let cancel = CancelHandle::new();
        let mut pacer = Pacer::new(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(10));
        let before = Instant::now();
        pacer.wait(&cancel).unwrap();
        assert!(before.elapsed() < Duration::from_millis(5));
    }

    #[test]
    fn test_cancel_checked_before_sleep() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        let mut pacer = Pacer::new(Duration::from_secs(60));
        assert!(matches!(pacer.wait(&cancel), Err(FleetError::Cancelled)));
        assert!(matches!(
            pause(Duration::from_secs(60), &cancel),
            Err(FleetError::Cancelled)
        ));
    }
}
