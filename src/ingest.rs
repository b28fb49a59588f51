// src/ingest.rs

//! Bounded channel between decode and store-append.
//!
//! The network task decodes payloads and pushes readings into a
//! [`SampleSink`]; a dedicated ingest task drains the channel and appends
//! into the store. This keeps decode-time latency out of the store's
//! critical section and gives the pipeline an explicit backpressure point.
//!
//! ## Backpressure
//!
//! The channel is bounded. When it is full, `push` drops the incoming
//! sample, counts it, and logs at warn — the network task never blocks on a
//! slow consumer. Eviction of old history is the store's job; the channel
//! only sheds load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::{Error, Reading, Result, StorePtr};

/// Sending half of the ingest channel.
///
/// Cheap to clone; all clones share one dropped-sample counter.
#[derive(Clone)]
pub struct SampleSink {
    // ---
    tx: mpsc::Sender<Reading>,
    dropped: Arc<AtomicU64>,
}

impl SampleSink {
    /// Forward a decoded reading to the ingest task.
    ///
    /// Never blocks. A full queue drops the sample (counted, logged at
    /// warn). Returns `Error::ChannelClosed` once the ingest task has
    /// stopped, at which point the caller should exit its serving loop.
    pub fn push(&self, reading: Reading) -> Result<()> {
        // ---
        match self.tx.try_send(reading) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.record_drop();
                warn!("ingest queue full, dropping sample");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(Error::ChannelClosed),
        }
    }

    /// Total samples lost so far, either to a full queue or to a failed
    /// decode upstream.
    pub fn dropped_samples(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Count one lost sample.
    pub(crate) fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Spawn the ingest task and return the sink feeding it.
///
/// The task appends every received reading into `store` and exits when the
/// stop signal fires or every sink clone has been dropped. `queue_depth` is
/// clamped to at least one slot.
pub fn spawn_ingest(
    store: StorePtr,
    queue_depth: usize,
    stop_rx: watch::Receiver<bool>,
) -> (SampleSink, JoinHandle<()>) {
    // ---
    let (tx, rx) = mpsc::channel(queue_depth.max(1));

    let sink = SampleSink {
        tx,
        dropped: Arc::new(AtomicU64::new(0)),
    };

    let task = tokio::spawn(run_ingest(store, rx, stop_rx));

    (sink, task)
}

/// Drain the channel into the store until stopped.
async fn run_ingest(
    store: StorePtr,
    mut rx: mpsc::Receiver<Reading>,
    mut stop_rx: watch::Receiver<bool>,
) {
    // ---
    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    debug!("ingest task stopping");
                    break;
                }
            }

            sample = rx.recv() => {
                match sample {
                    Some(reading) => store.append(reading),
                    None => {
                        debug!("all sample sinks dropped, ingest task stopping");
                        break;
                    }
                }
            }
        }
    }
}
