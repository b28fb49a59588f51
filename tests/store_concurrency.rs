// tests/store_concurrency.rs

//! Concurrent append/snapshot behavior of the telemetry store.
//!
//! A writer thread appends readings whose five fields are all derived from
//! one seed, so a torn read (fields from two different appends) is
//! detectable by recomputing each field from `raw`.

use std::thread;

use chrono::Local;

use aqmon::{Reading, TelemetryStore};

const CAPACITY: usize = 50;
const TOTAL_APPENDS: i64 = 1000;
const SNAPSHOT_ROUNDS: usize = 100;

fn reading_from_seed(seed: i64) -> Reading {
    // ---
    Reading {
        raw: seed,
        aqi: seed as f64 + 0.25,
        temperature: seed as f64 / 2.0,
        humidity: seed as f64 / 4.0,
        received_at: Local::now(),
    }
}

fn assert_not_torn(reading: &Reading) {
    // ---
    let seed = reading.raw;
    assert_eq!(reading.aqi, seed as f64 + 0.25, "aqi torn at seed {seed}");
    assert_eq!(
        reading.temperature,
        seed as f64 / 2.0,
        "temperature torn at seed {seed}"
    );
    assert_eq!(
        reading.humidity,
        seed as f64 / 4.0,
        "humidity torn at seed {seed}"
    );
}

#[test]
fn snapshots_never_observe_torn_or_reordered_readings() {
    // ---
    // Arrange
    // ---
    let store = TelemetryStore::with_capacity(CAPACITY);
    let writer_store = store.clone();

    // ---
    // Act: appends race against snapshots from this thread.
    // ---
    let writer = thread::spawn(move || {
        for seed in 0..TOTAL_APPENDS {
            writer_store.append(reading_from_seed(seed));
        }
    });

    let mut newest_seen = -1_i64;

    for _ in 0..SNAPSHOT_ROUNDS {
        let snap = store.snapshot();

        // ---
        // Assert: every snapshot is a well-formed window of the sequence.
        // ---
        for reading in &snap {
            assert_not_torn(reading);
        }

        for pair in snap.windows(2) {
            assert_eq!(
                pair[1].raw,
                pair[0].raw + 1,
                "snapshot skipped or duplicated a mid-sequence reading"
            );
        }

        if let Some(last) = snap.last() {
            assert!(
                last.raw >= newest_seen,
                "snapshot went backwards: saw {} after {}",
                last.raw,
                newest_seen
            );
            newest_seen = last.raw;
        }

        thread::yield_now();
    }

    writer.join().expect("writer thread panicked");

    // ---
    // Assert: final state is exactly the last CAPACITY appends, in order.
    // ---
    let final_snap = store.snapshot();
    assert_eq!(final_snap.len(), CAPACITY);
    assert_eq!(final_snap.first().unwrap().raw, TOTAL_APPENDS - CAPACITY as i64);
    assert_eq!(final_snap.last().unwrap().raw, TOTAL_APPENDS - 1);
}

#[test]
fn concurrent_snapshots_leave_store_untouched() {
    // ---
    let store = TelemetryStore::with_capacity(CAPACITY);

    for seed in 0..10 {
        store.append(reading_from_seed(seed));
    }

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let snap = store.snapshot();
                    assert_eq!(snap.len(), 10);
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().expect("reader thread panicked");
    }

    assert_eq!(store.len(), 10);
}
