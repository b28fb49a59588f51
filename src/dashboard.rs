// src/dashboard.rs

//! Snapshot-to-frame materialization and the render loop.
//!
//! On a fixed period the render loop snapshots the store, materializes a
//! [`DashboardFrame`], and hands it to the display seam. An empty snapshot
//! skips the cycle; it is "nothing to show yet", not an error. The loop
//! never observes ingestion failures — the two sides share only the store.

use std::time::Duration;

use log::{debug, error};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::{Display, Reading, StorePtr};

/// One dashboard table row, chronological order, most recent last.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    /// Arrival time label (`HH:MM:SS`).
    pub time_label: String,
    /// Raw MQ135 sensor value.
    pub raw: i64,
    /// Air-quality index.
    pub aqi: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl FrameRow {
    fn from_reading(reading: &Reading) -> Self {
        // ---
        Self {
            time_label: reading.time_label(),
            raw: reading.raw,
            aqi: reading.aqi,
            temperature: reading.temperature,
            humidity: reading.humidity,
        }
    }
}

/// Two named lines over shared time labels, for one time-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Chart title.
    pub title: &'static str,
    /// Shared x-axis labels, chronological.
    pub labels: Vec<String>,
    /// The two plotted lines, `(name, points)`, aligned with `labels`.
    pub lines: [(&'static str, Vec<f64>); 2],
}

/// Materialized render input for one dashboard cycle.
///
/// Built from a non-empty snapshot; rows are chronological with the most
/// recent reading last, matching arrival order in the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    rows: Vec<FrameRow>,
}

impl DashboardFrame {
    /// Build a frame from a snapshot, or `None` when there is nothing to
    /// show yet.
    pub fn from_snapshot(snapshot: &[Reading]) -> Option<Self> {
        // ---
        if snapshot.is_empty() {
            return None;
        }

        Some(Self {
            rows: snapshot.iter().map(FrameRow::from_reading).collect(),
        })
    }

    /// All rows, chronological, most recent last.
    pub fn rows(&self) -> &[FrameRow] {
        &self.rows
    }

    /// The most recent reading, for the latest-values header.
    pub fn latest(&self) -> &FrameRow {
        // Frames are only constructed from non-empty snapshots.
        self.rows.last().expect("frame always has at least one row")
    }

    /// Raw value and AQI over time, plotted together.
    pub fn value_series(&self) -> ChartSeries {
        // ---
        ChartSeries {
            title: "Sensor value / AQI",
            labels: self.labels(),
            lines: [
                ("MQ135 RAW", self.rows.iter().map(|r| r.raw as f64).collect()),
                ("AQI", self.rows.iter().map(|r| r.aqi).collect()),
            ],
        }
    }

    /// Temperature and humidity over time, plotted together.
    pub fn climate_series(&self) -> ChartSeries {
        // ---
        ChartSeries {
            title: "Temperature / Humidity",
            labels: self.labels(),
            lines: [
                (
                    "Temperature (C)",
                    self.rows.iter().map(|r| r.temperature).collect(),
                ),
                (
                    "Humidity (%)",
                    self.rows.iter().map(|r| r.humidity).collect(),
                ),
            ],
        }
    }

    fn labels(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.time_label.clone()).collect()
    }
}

/// Fixed-period snapshot-and-render loop.
///
/// The store handle and display are injected, so tests can drive a cycle
/// directly via [`tick`](Self::tick) with a recording display.
pub struct RenderLoop {
    // ---
    store: StorePtr,
    display: Box<dyn Display>,
    period: Duration,
}

impl RenderLoop {
    /// Create a render loop over `store` with the given display and period.
    pub fn new(store: StorePtr, display: Box<dyn Display>, period: Duration) -> Self {
        Self {
            store,
            display,
            period,
        }
    }

    /// Run one render cycle: snapshot, materialize, display.
    ///
    /// Skips silently on an empty store. Display failures are logged and do
    /// not stop the loop.
    pub fn tick(&mut self) {
        // ---
        let snapshot = self.store.snapshot();

        match DashboardFrame::from_snapshot(&snapshot) {
            Some(frame) => {
                if let Err(err) = self.display.render(&frame) {
                    error!("display error, skipping cycle: {err}");
                }
            }
            None => debug!("no readings yet, skipping render cycle"),
        }
    }

    /// Render on the configured period until the stop signal fires.
    ///
    /// A tick missed while a render ran long is skipped, not replayed; the
    /// dashboard always shows current state, never a backlog.
    pub async fn run(mut self, mut stop_rx: watch::Receiver<bool>) {
        // ---
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        debug!("render loop stopping");
                        break;
                    }
                }

                _ = ticker.tick() => self.tick(),
            }
        }
    }
}
