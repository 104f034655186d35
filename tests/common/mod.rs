use moodgate::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A realistic epoch base so the zero-value state reads as expired, the way
/// it always does under a wall clock.
pub const BASE: u64 = 1_700_000_000_000;
pub const MINUTE: u64 = 60 * 1_000;

#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn at(millis: u64) -> Self {
        Self { now: Arc::new(AtomicU64::new(millis)) }
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
