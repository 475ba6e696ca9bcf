//! Request pacing for providers with a per-caller rate policy.

use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{Instant, sleep_until};

/// Hands out one request token at a time, spaced by a minimum interval.
///
/// The interval is measured from the moment the previous permit was
/// released, so it holds regardless of how long a request takes or
/// whether it succeeded. Holding a permit excludes every other caller.
#[derive(Debug)]
pub struct Pacer {
    interval: Duration,
    last_release: Mutex<Option<Instant>>,
}

/// Exclusive right to issue one request. Dropping it starts the interval.
#[derive(Debug)]
pub struct PacerPermit<'a> {
    last_release: MutexGuard<'a, Option<Instant>>,
}

impl Pacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_release: Mutex::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until a request may be issued.
    ///
    /// The first acquire never waits.
    pub async fn acquire(&self) -> PacerPermit<'_> {
        let last_release = self.last_release.lock().await;
        if let Some(prev) = *last_release {
            sleep_until(prev + self.interval).await;
        }
        PacerPermit { last_release }
    }
}

impl Drop for PacerPermit<'_> {
    fn drop(&mut self) {
        *self.last_release = Some(Instant::now());
    }
}
