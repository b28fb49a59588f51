//! Live air-quality telemetry monitor over MQTT pub/sub
//!
//! This crate ingests streaming sensor readings from a message broker,
//! retains a bounded recent-history window, and renders it as a
//! periodically refreshed dashboard. The subscriber worker and the render
//! loop run concurrently and share exactly one thing: the lock-guarded
//! telemetry store.
//!
//! Data flow: broker → subscriber worker (decode) → ingest channel →
//! store (append) → render loop (snapshot) → display.
//!

// Import all sub modules once...
mod config;
mod dashboard;
mod display;
mod error;
mod ingest;
mod reading;
mod store;
mod subscriber;

// Re-export main types
pub use config::MonitorConfig;
pub use error::{Error, Result};

pub use reading::{decode_payload, Reading};
pub use store::{StorePtr, TelemetryStore};

pub use ingest::{spawn_ingest, SampleSink};
pub use subscriber::{spawn_subscriber, SubscriberHandle};

pub use dashboard::{ChartSeries, DashboardFrame, FrameRow, RenderLoop};
pub use display::{ConsoleDisplay, Display};
