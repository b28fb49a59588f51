use thiserror::Error;

/// Errors that can occur while ingesting or rendering telemetry
#[derive(Error, Debug)]
pub enum Error {
    /// Payload could not be decoded as a complete sensor record
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// MQTT client error (subscribe/disconnect plumbing)
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Ingest channel receiver is gone; the worker cannot make progress
    #[error("ingest channel closed")]
    ChannelClosed,

    /// Terminal/display write failed
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, Error>;
