use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Allocates record identifiers. Seeded from wall-clock milliseconds at
/// startup and incremented per allocation, so ids keep the millisecond
/// magnitude (newest-first ordering by id holds) without the collision
/// window of deriving each id from the clock directly.
pub struct IdGenerator {
    next: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicI64::new(Utc::now().timestamp_millis()),
        }
    }

    pub fn next_id(&self) -> i64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
