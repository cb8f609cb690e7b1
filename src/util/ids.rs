use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

static LAST_STAMP: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp that never repeats within this process.
///
/// Task ids and backup stamps are both derived from wall-clock milliseconds;
/// two calls in the same millisecond would otherwise collide, so each call
/// advances at least one past the previous result.
pub fn monotonic_millis() -> i64 {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_STAMP.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => prev = observed,
        }
    }
}

/// Fresh opaque identifier for tasks, categories, and properties.
pub fn fresh_id() -> String {
    monotonic_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn monotonic_millis_strictly_increases() {
        let mut prev = monotonic_millis();
        for _ in 0..1000 {
            let next = monotonic_millis();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn fresh_ids_are_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| fresh_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
