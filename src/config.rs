//! Static, startup-time monitor configuration.
//!
//! This type intentionally contains no MQTT client concepts; the subscriber
//! worker is responsible for interpreting it into concrete connection
//! settings. All values are fixed for the lifetime of the process — there is
//! no runtime reconfiguration.

use std::time::Duration;

/// Default MQTT port.
const DEFAULT_PORT: u16 = 1883;

/// Default telemetry topic published by the sensor node.
const DEFAULT_TOPIC: &str = "airmonitor/data";

/// Default bounded-history capacity (number of retained readings).
const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default dashboard refresh period.
const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(2);

/// Default depth of the decode → append ingest channel.
const DEFAULT_INGEST_QUEUE_DEPTH: usize = 64;

/// Default broker keep-alive interval.
const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(60);

/// Connection and behavior parameters for the monitor.
///
/// # Example
///
/// ```
/// use aqmon::MonitorConfig;
/// use std::time::Duration;
///
/// let config = MonitorConfig::new("broker.example.com", "aqmon-dashboard")
///     .with_credentials("station", "secret")
///     .with_topic("airmonitor/data")
///     .with_refresh_period(Duration::from_secs(2));
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Broker hostname or IP address.
    pub broker_host: String,

    /// Broker TCP port.
    pub broker_port: u16,

    /// Optional username/password pair for broker authentication.
    pub credentials: Option<(String, String)>,

    /// MQTT client identifier for this monitor instance, used for logging
    /// and broker-side session tracking.
    pub client_id: String,

    /// Telemetry topic to subscribe to.
    pub topic: String,

    /// Broker keep-alive interval.
    pub keep_alive: Duration,

    /// Maximum number of readings retained in the telemetry store.
    pub history_capacity: usize,

    /// Period between dashboard render cycles.
    pub refresh_period: Duration,

    /// Capacity of the bounded channel between decode and store-append.
    ///
    /// When the channel is full, incoming samples are dropped (and counted)
    /// rather than blocking the network task.
    pub ingest_queue_depth: usize,
}

impl MonitorConfig {
    /// Create a config for the given broker host with all other fields at
    /// their defaults.
    pub fn new(broker_host: impl Into<String>, client_id: impl Into<String>) -> Self {
        // ---
        Self {
            broker_host: broker_host.into(),
            broker_port: DEFAULT_PORT,
            credentials: None,
            client_id: client_id.into(),
            topic: DEFAULT_TOPIC.to_string(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            refresh_period: DEFAULT_REFRESH_PERIOD,
            ingest_queue_depth: DEFAULT_INGEST_QUEUE_DEPTH,
        }
    }

    /// Set an explicit broker port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.broker_port = port;
        self
    }

    /// Set broker credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Set the telemetry topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the broker keep-alive interval.
    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Set the bounded-history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the dashboard refresh period.
    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }

    /// Set the ingest channel depth.
    pub fn with_ingest_queue_depth(mut self, depth: usize) -> Self {
        self.ingest_queue_depth = depth;
        self
    }
}

impl Default for MonitorConfig {
    /// Local-broker defaults, matching a development MQTT setup.
    fn default() -> Self {
        Self::new("localhost", "aqmon")
    }
}
