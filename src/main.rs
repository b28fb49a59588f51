//! Air-quality dashboard binary.
//!
//! Wires configuration, store, subscriber worker, and render loop together
//! and runs until Ctrl-C.
//!
//! Environment overrides:
//! - `AQMON_BROKER`   broker host (default `localhost`)
//! - `AQMON_PORT`     broker port (default `1883`)
//! - `AQMON_TOPIC`    telemetry topic (default `airmonitor/data`)
//! - `AQMON_USERNAME` / `AQMON_PASSWORD`  broker credentials (optional)

use log::info;
use tokio::sync::watch;

use aqmon::{
    // ---
    spawn_subscriber,
    ConsoleDisplay,
    MonitorConfig,
    RenderLoop,
    TelemetryStore,
};

fn config_from_env() -> MonitorConfig {
    // ---
    let host = std::env::var("AQMON_BROKER").unwrap_or_else(|_| "localhost".to_string());

    let mut config = MonitorConfig::new(host, "aqmon-dashboard");

    if let Ok(port) = std::env::var("AQMON_PORT") {
        if let Ok(port) = port.parse() {
            config = config.with_port(port);
        }
    }

    if let Ok(topic) = std::env::var("AQMON_TOPIC") {
        config = config.with_topic(topic);
    }

    if let (Ok(username), Ok(password)) = (
        std::env::var("AQMON_USERNAME"),
        std::env::var("AQMON_PASSWORD"),
    ) {
        config = config.with_credentials(username, password);
    }

    config
}

#[tokio::main]
async fn main() -> aqmon::Result<()> {
    // ---
    env_logger::init();

    let config = config_from_env();
    info!(
        "starting monitor: broker {}:{}, topic {}",
        config.broker_host, config.broker_port, config.topic
    );

    let store = TelemetryStore::with_capacity(config.history_capacity);
    let worker = spawn_subscriber(&config, store.clone());

    let (stop_tx, stop_rx) = watch::channel(false);
    let render = RenderLoop::new(
        store,
        Box::new(ConsoleDisplay::new()),
        config.refresh_period,
    );
    let render_task = tokio::spawn(render.run(stop_rx));

    // Block until Ctrl+C
    tokio::signal::ctrl_c().await.ok();
    info!("shutting down");

    let _ = stop_tx.send(true);
    let _ = render_task.await;
    worker.shutdown().await;

    Ok(())
}
