// src/reading.rs

//! Sensor readings and the payload decode layer.
//!
//! A [`Reading`] is one aligned five-field sample: the four values decoded
//! from a single broker message plus one wall-clock arrival stamp. Partial
//! readings are never constructed — decode either yields a complete
//! `Reading` or fails, and validation happens here rather than in the store.

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::Result;

/// Wire format of one sensor publish.
///
/// The sensor node publishes a flat JSON record; all four keys are required.
/// Unknown keys are ignored. The raw channel is an integer on the wire —
/// fractional values are rejected, not truncated.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "MQ135_RAW")]
    raw: i64,

    #[serde(rename = "AQI")]
    aqi: f64,

    #[serde(rename = "Temp")]
    temperature: f64,

    #[serde(rename = "Humidity")]
    humidity: f64,
}

/// One ingested telemetry sample.
///
/// All five fields belong together: the four sensor values come from one
/// decoded message and `received_at` is stamped once at arrival. Readings
/// are stored and copied as whole values, so field alignment can never be
/// broken downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Raw MQ135 sensor value.
    pub raw: i64,

    /// Computed air-quality index.
    pub aqi: f64,

    /// Temperature in degrees Celsius.
    pub temperature: f64,

    /// Relative humidity in percent.
    pub humidity: f64,

    /// Wall-clock arrival time of the message.
    pub received_at: DateTime<Local>,
}

impl Reading {
    /// Arrival time formatted for the dashboard time axis (second precision).
    pub fn time_label(&self) -> String {
        self.received_at.format("%H:%M:%S").to_string()
    }
}

/// Decode a broker payload into a fully-populated [`Reading`].
///
/// Stamps the arrival time from the wall clock. Returns `Error::Decode` for
/// malformed JSON, a missing required key, or a wrong-typed value; callers
/// drop the message and keep processing.
pub fn decode_payload(payload: &[u8]) -> Result<Reading> {
    // ---
    let wire: WireRecord = serde_json::from_slice(payload)?;

    Ok(Reading {
        raw: wire.raw,
        aqi: wire.aqi,
        temperature: wire.temperature,
        humidity: wire.humidity,
        received_at: Local::now(),
    })
}
