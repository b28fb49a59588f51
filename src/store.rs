// src/store.rs

//! Bounded telemetry store.
//!
//! This is the only shared mutable state between the subscriber worker and
//! the render loop: a fixed-capacity ring buffer of [`Reading`]s, oldest
//! evicted first, guarded by a single exclusive lock.
//!
//! ## Semantics
//!
//! - `append()` inserts a fully-populated reading, evicting the oldest when
//!   at capacity. It never fails; malformed input is rejected upstream by
//!   the decode layer and never reaches the store.
//! - `snapshot()` copies the current contents under the lock and returns an
//!   independent `Vec` that is safe to read with no lock held.
//! - Readings are stored and copied as whole values, so a snapshot can never
//!   observe a reading whose fields come from two different messages.
//!
//! ## Non-Goals
//!
//! - Persistence beyond the in-memory window
//! - Multiple writer types (append is the only mutation)
//! - Reordering or gap correction for late/dropped messages

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::Reading;

/// Acquire a mutex guard, intentionally ignoring poisoning.
///
/// Poisoning here means a test thread panicked while holding the lock. The
/// protected state is a deque of self-contained values with no cross-field
/// invariants, so the recovered contents are still well-formed; the worst
/// outcome is a snapshot missing the reading that was mid-append.
fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // ---
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Fixed-capacity, lock-guarded history of recent readings.
///
/// Created once at startup and shared by handle: the subscriber worker holds
/// one clone for `append`, the render loop another for `snapshot`. Critical
/// sections contain no await points, so the lock is held only for the
/// duration of a deque operation or a copy.
pub struct TelemetryStore {
    // ---
    history: Mutex<VecDeque<Reading>>,
    capacity: usize,
}

/// Shared store handle.
pub type StorePtr = Arc<TelemetryStore>;

impl TelemetryStore {
    /// Create a store retaining at most `capacity` readings.
    ///
    /// A capacity of zero is clamped to one so that `append` always has
    /// somewhere to put the newest reading.
    pub fn with_capacity(capacity: usize) -> StorePtr {
        // ---
        let capacity = capacity.max(1);

        Arc::new(Self {
            history: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        })
    }

    /// Insert a reading, evicting the oldest when the window is full.
    ///
    /// Insertion order is arrival order; the store never reorders.
    pub fn append(&self, reading: Reading) {
        // ---
        let mut history = lock_ignore_poison(&self.history);

        if history.len() == self.capacity {
            history.pop_front();
        }
        history.push_back(reading);
    }

    /// Copy the current contents, oldest first.
    ///
    /// The copy is taken in one critical section, so it reflects a single
    /// consistent state of the window. Returns an empty `Vec` until the
    /// first successful append.
    pub fn snapshot(&self) -> Vec<Reading> {
        // ---
        let history = lock_ignore_poison(&self.history);
        history.iter().cloned().collect()
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        lock_ignore_poison(&self.history).len()
    }

    /// True when no reading has been appended yet.
    pub fn is_empty(&self) -> bool {
        lock_ignore_poison(&self.history).is_empty()
    }

    /// Maximum number of retained readings.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn reading(raw: i64, aqi: f64, temperature: f64, humidity: f64) -> Reading {
        // ---
        Reading {
            raw,
            aqi,
            temperature,
            humidity,
            received_at: Local::now(),
        }
    }

    #[test]
    fn empty_store_snapshots_empty() {
        // ---
        let store = TelemetryStore::with_capacity(50);

        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn retains_arrival_order_below_capacity() {
        // ---
        let store = TelemetryStore::with_capacity(50);

        for raw in 0..10 {
            store.append(reading(raw, 0.0, 0.0, 0.0));
        }

        let snap = store.snapshot();
        assert_eq!(snap.len(), 10);

        let raws: Vec<i64> = snap.iter().map(|r| r.raw).collect();
        assert_eq!(raws, (0..10).collect::<Vec<i64>>());
    }

    #[test]
    fn evicts_oldest_first_at_capacity() {
        // Three appends into a two-slot window keep only the last two.
        let store = TelemetryStore::with_capacity(2);

        store.append(reading(100, 50.0, 25.0, 60.0));
        store.append(reading(110, 55.0, 25.5, 61.0));
        store.append(reading(90, 48.0, 24.8, 59.5));

        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);

        assert_eq!(snap[0].raw, 110);
        assert_eq!(snap[0].aqi, 55.0);
        assert_eq!(snap[1].raw, 90);
        assert_eq!(snap[1].humidity, 59.5);
    }

    #[test]
    fn window_slides_over_long_sequences() {
        // 60 appends into a 50-slot window retain appends #11..=#60.
        let store = TelemetryStore::with_capacity(50);

        for raw in 1..=60 {
            store.append(reading(raw, raw as f64, 0.0, 0.0));
        }

        let snap = store.snapshot();
        assert_eq!(snap.len(), 50);
        assert_eq!(snap.first().unwrap().raw, 11);
        assert_eq!(snap.last().unwrap().raw, 60);

        for window in snap.windows(2) {
            assert_eq!(window[1].raw, window[0].raw + 1);
        }
    }

    #[test]
    fn snapshot_is_independent_of_later_appends() {
        // ---
        let store = TelemetryStore::with_capacity(5);
        store.append(reading(1, 1.0, 1.0, 1.0));

        let snap = store.snapshot();
        store.append(reading(2, 2.0, 2.0, 2.0));

        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].raw, 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        // ---
        let store = TelemetryStore::with_capacity(0);
        assert_eq!(store.capacity(), 1);

        store.append(reading(1, 0.0, 0.0, 0.0));
        store.append(reading(2, 0.0, 0.0, 0.0));

        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].raw, 2);
    }
}
