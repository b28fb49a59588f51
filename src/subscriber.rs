// src/subscriber.rs

//! MQTT subscriber worker.
//!
//! This module owns the broker connection. It follows an actor model: a
//! single background task owns the MQTT `EventLoop` and is the only task
//! that ever touches the client. The task is responsible for:
//!
//! - establishing the subscription once the broker accepts the connection
//!   (and re-establishing it after a reconnect),
//! - decoding incoming publishes and forwarding complete readings into the
//!   ingest channel,
//! - riding out connection errors without exiting its serving loop.
//!
//! ## Failure behavior
//!
//! A malformed message is dropped, counted, and logged at warn; the next
//! message is processed normally. Connection loss is logged and retried
//! after a fixed delay — rumqttc re-dials on the next poll. Neither failure
//! ever reaches the render loop; the two sides share only the store.
//!
//! ## Shutdown
//!
//! Both the event-loop task and the ingest task watch a stop signal and
//! exit promptly when it fires. [`SubscriberHandle::shutdown`] signals and
//! awaits both.

use std::time::Duration;

use log::{debug, error, info, warn};
use rumqttc::{
    //
    AsyncClient,
    ConnectReturnCode,
    Event,
    EventLoop,
    MqttOptions,
    Packet,
    Publish,
    QoS,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{
    // ---
    decode_payload,
    ingest::spawn_ingest,
    Error,
    MonitorConfig,
    Result,
    SampleSink,
    StorePtr,
};

/// Delay before re-polling the event loop after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Running subscriber worker.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) also
/// stops both tasks: the stop sender drops with the handle and the tasks
/// treat a closed stop channel as a stop signal.
pub struct SubscriberHandle {
    // ---
    stop_tx: watch::Sender<bool>,
    event_task: JoinHandle<()>,
    ingest_task: JoinHandle<()>,
    sink: SampleSink,
}

impl SubscriberHandle {
    /// Signal both worker tasks to stop and wait for them to finish.
    pub async fn shutdown(self) {
        // ---
        let _ = self.stop_tx.send(true);

        // JoinError here means the task panicked; there is nothing left to
        // unwind at shutdown, so it is logged and swallowed.
        if self.event_task.await.is_err() {
            error!("subscriber event-loop task panicked");
        }
        if self.ingest_task.await.is_err() {
            error!("ingest task panicked");
        }
    }

    /// Total samples lost so far (failed decode or full ingest queue).
    pub fn dropped_samples(&self) -> u64 {
        self.sink.dropped_samples()
    }
}

/// Spawn the subscriber worker for the configured broker and topic.
///
/// Connection is lazy: it happens when the event loop first polls, so this
/// function is infallible. Connection failures surface in the worker's log
/// output, not here.
pub fn spawn_subscriber(config: &MonitorConfig, store: StorePtr) -> SubscriberHandle {
    // ---
    let mut options = MqttOptions::new(
        config.client_id.clone(),
        config.broker_host.clone(),
        config.broker_port,
    );
    options.set_keep_alive(config.keep_alive);

    if let Some((username, password)) = &config.credentials {
        options.set_credentials(username.clone(), password.clone());
    }

    let (client, event_loop) = AsyncClient::new(options, 10);

    let (stop_tx, stop_rx) = watch::channel(false);
    let (sink, ingest_task) = spawn_ingest(store, config.ingest_queue_depth, stop_rx.clone());

    let worker = EventLoopWorker {
        client,
        event_loop,
        topic: config.topic.clone(),
        sink: sink.clone(),
        stop_rx,
        connected_before: false,
    };

    let event_task = tokio::spawn(worker.run());

    SubscriberHandle {
        stop_tx,
        event_task,
        ingest_task,
        sink,
    }
}

/// Owns the MQTT client and event loop for the lifetime of the worker.
struct EventLoopWorker {
    // ---
    client: AsyncClient,
    event_loop: EventLoop,
    topic: String,
    sink: SampleSink,
    stop_rx: watch::Receiver<bool>,

    /// Whether a CONNACK has been seen before, to tell a reconnect from the
    /// initial connection in the logs.
    connected_before: bool,
}

impl EventLoopWorker {
    // ---

    async fn run(mut self) {
        // ---
        loop {
            tokio::select! {
                changed = self.stop_rx.changed() => {
                    if changed.is_err() || *self.stop_rx.borrow() {
                        let _ = self.client.disconnect().await;
                        debug!("subscriber worker stopping");
                        break;
                    }
                }

                event = self.event_loop.poll() => {
                    match event {
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            if let Err(err) = self.handle_publish(publish) {
                                // Only ChannelClosed escapes handle_publish;
                                // without an ingest side there is no work left.
                                error!("subscriber worker exiting: {err}");
                                break;
                            }
                        }

                        Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                            self.handle_connack(connack).await;
                        }

                        Ok(_event) => {
                            debug!("ignoring mqtt event: {_event:?}");
                        }

                        Err(err) => {
                            error!("mqtt connection error: {err}");

                            // Stay stop-responsive while backing off.
                            tokio::select! {
                                changed = self.stop_rx.changed() => {
                                    if changed.is_err() || *self.stop_rx.borrow() {
                                        debug!("subscriber worker stopping during backoff");
                                        break;
                                    }
                                }
                                _ = tokio::time::sleep(RECONNECT_DELAY) => {}
                            }
                        }
                    }
                }
            }
        }
    }

    /// Decode one publish and forward the reading into the ingest channel.
    ///
    /// Decode failures are dropped and counted; the error return is reserved
    /// for a closed ingest channel.
    fn handle_publish(&self, publish: Publish) -> Result<()> {
        // ---
        if publish.topic != self.topic {
            debug!("ignoring publish on unexpected topic {}", publish.topic);
            return Ok(());
        }

        match decode_payload(&publish.payload) {
            Ok(reading) => self.sink.push(reading),
            Err(err) => {
                self.sink.record_drop();
                warn!("discarding malformed telemetry message: {err}");
                Ok(())
            }
        }
    }

    /// React to the broker accepting (or refusing) the connection.
    async fn handle_connack(&mut self, connack: rumqttc::ConnAck) {
        // ---
        if connack.code != ConnectReturnCode::Success {
            error!("broker refused connection: {:?}", connack.code);
            return;
        }

        if self.connected_before {
            info!("reconnected to broker, re-subscribing to {}", self.topic);
        } else {
            info!("connected to broker, subscribing to {}", self.topic);
            self.connected_before = true;
        }

        if let Err(err) = Self::subscribe(&self.client, &self.topic).await {
            error!("subscribe failed for {}: {err}", self.topic);
        }
    }

    async fn subscribe(client: &AsyncClient, topic: &str) -> Result<()> {
        // ---
        client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(Error::Mqtt)
    }
}
