// tests/render.rs

//! Render loop behavior against a recording display.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Local;
use tokio::sync::watch;
use tokio::time::timeout;

use aqmon::{
    // ---
    DashboardFrame,
    Display,
    Reading,
    RenderLoop,
    Result,
    TelemetryStore,
};

/// Display that records every frame it is asked to render.
#[derive(Clone, Default)]
struct RecordingDisplay {
    frames: Arc<Mutex<Vec<DashboardFrame>>>,
}

impl RecordingDisplay {
    fn frames(&self) -> Vec<DashboardFrame> {
        self.frames.lock().unwrap().clone()
    }
}

impl Display for RecordingDisplay {
    fn render(&mut self, frame: &DashboardFrame) -> Result<()> {
        self.frames.lock().unwrap().push(frame.clone());
        Ok(())
    }
}

/// Display that always fails, for the error-isolation path.
#[derive(Clone, Default)]
struct FailingDisplay {
    calls: Arc<Mutex<usize>>,
}

impl Display for FailingDisplay {
    fn render(&mut self, _frame: &DashboardFrame) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        Err(std::io::Error::other("terminal gone").into())
    }
}

fn reading(raw: i64) -> Reading {
    // ---
    Reading {
        raw,
        aqi: raw as f64 + 0.5,
        temperature: 22.0,
        humidity: 58.0,
        received_at: Local::now(),
    }
}

#[test]
fn empty_store_renders_nothing() {
    // ---
    let store = TelemetryStore::with_capacity(50);
    let display = RecordingDisplay::default();

    let mut render = RenderLoop::new(
        store,
        Box::new(display.clone()),
        Duration::from_millis(10),
    );

    for _ in 0..3 {
        render.tick();
    }

    assert!(display.frames().is_empty());
}

#[test]
fn tick_renders_current_snapshot() {
    // ---
    let store = TelemetryStore::with_capacity(50);
    let display = RecordingDisplay::default();

    store.append(reading(1));
    store.append(reading(2));
    store.append(reading(3));

    let mut render = RenderLoop::new(
        store.clone(),
        Box::new(display.clone()),
        Duration::from_millis(10),
    );
    render.tick();

    let frames = display.frames();
    assert_eq!(frames.len(), 1);

    let frame = &frames[0];
    let raws: Vec<i64> = frame.rows().iter().map(|r| r.raw).collect();
    assert_eq!(raws, vec![1, 2, 3]);
    assert_eq!(frame.latest().raw, 3);

    // The next tick reflects appends made in between.
    store.append(reading(4));
    render.tick();

    let frames = display.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].latest().raw, 4);
}

#[test]
fn display_failure_never_stops_the_loop() {
    // ---
    let store = TelemetryStore::with_capacity(50);
    let display = FailingDisplay::default();

    store.append(reading(1));

    let mut render = RenderLoop::new(
        store,
        Box::new(display.clone()),
        Duration::from_millis(10),
    );

    render.tick();
    render.tick();

    assert_eq!(*display.calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn run_renders_periodically_until_stopped() {
    // ---
    let store = TelemetryStore::with_capacity(50);
    let display = RecordingDisplay::default();

    store.append(reading(7));

    let render = RenderLoop::new(
        store,
        Box::new(display.clone()),
        Duration::from_millis(10),
    );

    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(render.run(stop_rx));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(true).expect("stop signal send failed");

    timeout(Duration::from_secs(1), task)
        .await
        .expect("render loop did not stop")
        .expect("render loop panicked");

    let frames = display.frames();
    assert!(
        !frames.is_empty(),
        "expected at least one render in 100ms at a 10ms period"
    );
    assert!(frames.iter().all(|f| f.latest().raw == 7));
}
