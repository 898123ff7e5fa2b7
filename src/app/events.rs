use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use rand::Rng;
use tokio::{
    sync::mpsc::Sender,
    time::{MissedTickBehavior, interval, sleep},
};

use crate::domain::weather::{ConditionsSnapshot, Location};

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickFrame,
    TickRefresh,
    Input(Event),
    LocationResolved(Location),
    GeocodeFailed(String),
    FetchStarted,
    FetchSucceeded(ConditionsSnapshot),
    FetchFailed(String),
    Quit,
}

pub fn spawn_input_task() -> impl futures::Stream<Item = Event> {
    EventStream::new().filter_map(|event| async move { event.ok() })
}

/// The display refresh signal: one `TickFrame` per frame period.
pub fn start_frame_task(tx: Sender<AppEvent>, fps: u8) {
    let period = frame_period(fps);
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::TickFrame).await.is_err() {
                break;
            }
        }
    });
}

pub fn start_refresh_task(tx: Sender<AppEvent>, refresh_secs: u64) {
    tokio::spawn(async move {
        loop {
            let wait = jittered(refresh_secs, rand::rng().random_range(-0.1f32..0.1f32));
            sleep(wait).await;
            if tx.send(AppEvent::TickRefresh).await.is_err() {
                break;
            }
        }
    });
}

pub fn schedule_retry(tx: Sender<AppEvent>, delay: Duration) {
    tokio::spawn(async move {
        sleep(delay.max(Duration::from_secs(1))).await;
        let _ = tx.send(AppEvent::TickRefresh).await;
    });
}

pub fn frame_period(fps: u8) -> Duration {
    Duration::from_millis(1000 / u64::from(fps.clamp(15, 60)))
}

fn jittered(base_secs: u64, jitter: f32) -> Duration {
    let base = base_secs.max(10) as f32;
    Duration::from_secs_f32((base * (1.0 + jitter)).max(1.0))
}
