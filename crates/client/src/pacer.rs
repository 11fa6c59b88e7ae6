//! Fixed spacing between outbound API calls.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between consecutive calls.
///
/// One pacer is shared by every client of a process; the lock is held
/// across the sleep so waiters are released one interval apart.
#[derive(Debug)]
pub struct Pacer {
    interval: Option<Duration>,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub const fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last_call: Mutex::const_new(None),
        }
    }

    /// A pacer that never waits.
    pub const fn unpaced() -> Self {
        Self::new(None)
    }

    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Wait until the next call may go out, then claim the slot.
    pub async fn wait(&self) {
        let Some(interval) = self.interval else {
            return;
        };
        let mut last_call = self.last_call.lock().await;
        if let Some(deadline) = (*last_call).and_then(|previous| previous.checked_add(interval)) {
            tokio::time::sleep_until(deadline).await;
        }
        *last_call = Some(Instant::now());
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::unpaced()
    }
}
