//! Session id minting.

use super::model::SessionId;
use std::sync::atomic::{AtomicI64, Ordering};

/// Mints session ids from the wall clock.
///
/// Ids are Unix milliseconds, but never less than or equal to the last id
/// handed out, so two conversations started within one millisecond still
/// get distinct ids. A seed at `i64::MAX` pins the generator there instead
/// of overflowing.
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    last: AtomicI64,
}

impl SessionIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts above `last`, e.g. the largest id found in stored history.
    pub fn seeded(last: SessionId) -> Self {
        Self {
            last: AtomicI64::new(last),
        }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> SessionId {
        let now = chrono::Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let ids = SessionIdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_seed_in_the_future_is_respected() {
        let far = chrono::Utc::now().timestamp_millis() + 1_000_000;
        let ids = SessionIdGenerator::seeded(far);
        assert_eq!(ids.next_id(), far + 1);
    }

    #[test]
    fn test_seed_at_max_does_not_overflow() {
        let ids = SessionIdGenerator::seeded(i64::MAX);
        assert_eq!(ids.next_id(), i64::MAX);
        assert_eq!(ids.next_id(), i64::MAX);
    }
}
