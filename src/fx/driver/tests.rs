use std::time::Duration;

use super::*;
use crate::fx::{
    frames::FrameQueue,
    rain::Rain,
    snow::Snow,
    surface::{DrawCommand, RecordingSurface},
};

fn viewport() -> Viewport {
    Viewport::new(800.0, 600.0, 1.0)
}

fn rain_driver() -> AnimationDriver<Rain, RecordingSurface> {
    AnimationDriver::new(
        "rain",
        ParticleField::seeded(Rain::default(), 42),
        Some(RecordingSurface::new()),
        viewport(),
    )
}

fn pump(
    driver: &mut AnimationDriver<Rain, RecordingSurface>,
    frames: &mut FrameQueue,
    now: Instant,
) -> usize {
    let mut fired = 0;
    for token in frames.take_due() {
        if driver.on_frame(token, now, frames) {
            fired += 1;
        }
    }
    fired
}

#[test]
fn construction_sizes_surface_and_field() {
    let driver = rain_driver();
    assert_eq!(driver.phase(), DriverPhase::Idle);
    assert_eq!(driver.field().map(ParticleField::len), Some(140));
    assert_eq!(
        driver.surface().map(|s| s.commands[0].clone()),
        Some(DrawCommand::BackingSize {
            width: 800,
            height: 600,
            scale: 1.0,
        })
    );
}

#[test]
fn activation_schedules_exactly_one_frame() {
    let mut driver = rain_driver();
    let mut frames = FrameQueue::new();
    let now = Instant::now();

    driver.set_active(true, now, &mut frames);
    driver.set_active(true, now, &mut frames);

    assert!(driver.is_active());
    assert_eq!(frames.len(), 1);
    assert!(driver.owns(frames.take_due()[0]));
}

#[test]
fn active_driver_repaints_every_frame() {
    let mut driver = rain_driver();
    let mut frames = FrameQueue::new();
    let start = Instant::now();
    driver.set_active(true, start, &mut frames);

    for i in 1..=5 {
        assert_eq!(pump(&mut driver, &mut frames, start + Duration::from_millis(16 * i)), 1);
    }

    let surface = driver.surface().expect("surface");
    assert_eq!(surface.clears(), 5);
    assert_eq!(frames.len(), 1);
}

#[test]
fn deactivation_cancels_and_clears_once() {
    let mut driver = rain_driver();
    let mut frames = FrameQueue::new();
    let now = Instant::now();
    driver.set_active(true, now, &mut frames);

    driver.set_active(false, now, &mut frames);
    let clears = driver.surface().map(RecordingSurface::clears);
    driver.set_active(false, now, &mut frames);

    assert!(frames.is_idle());
    assert_eq!(driver.phase(), DriverPhase::Idle);
    assert_eq!(clears, Some(1));
    assert_eq!(driver.surface().map(RecordingSurface::clears), Some(1));
}

#[test]
fn stale_frame_after_deactivation_does_not_reschedule() {
    let mut driver = rain_driver();
    let mut frames = FrameQueue::new();
    let now = Instant::now();
    driver.set_active(true, now, &mut frames);
    let in_flight = frames.take_due();

    driver.set_active(false, now, &mut frames);
    for token in in_flight {
        assert!(!driver.on_frame(token, now + Duration::from_millis(16), &mut frames));
    }

    assert!(frames.is_idle());
    assert_eq!(driver.pending_frame(), None);
}

#[test]
fn reactivation_ignores_tokens_from_previous_run() {
    let mut driver = rain_driver();
    let mut frames = FrameQueue::new();
    let now = Instant::now();
    driver.set_active(true, now, &mut frames);
    let old = frames.take_due();

    driver.set_active(false, now, &mut frames);
    driver.set_active(true, now, &mut frames);

    for token in old {
        assert!(!driver.on_frame(token, now, &mut frames));
    }
    assert_eq!(frames.len(), 1);
    assert_eq!(pump(&mut driver, &mut frames, now + Duration::from_millis(16)), 1);
}

#[test]
fn long_pauses_are_capped() {
    let mut driver: AnimationDriver<Snow, RecordingSurface> = AnimationDriver::new(
        "snow",
        ParticleField::seeded(Snow, 8),
        Some(RecordingSurface::new()),
        viewport(),
    );
    let mut frames = FrameQueue::new();
    let start = Instant::now();
    driver.set_active(true, start, &mut frames);
    let before: Vec<f32> = driver
        .field()
        .expect("field")
        .particles()
        .iter()
        .map(|f| f.body.y)
        .collect();

    let token = frames.take_due()[0];
    driver.on_frame(token, start + Duration::from_secs(30), &mut frames);

    let field = driver.field().expect("field");
    for (flake, y0) in field.particles().iter().zip(before) {
        let moved = flake.body.y - y0;
        // 34ms at the fastest flake speed (2.1px per 16ms).
        assert!(moved <= 2.1 * 34.0 / 16.0 + 1e-3, "moved {moved}");
    }
}

#[test]
fn resize_accounts_for_pixel_ratio() {
    let mut driver = rain_driver();
    driver.resize(Viewport::new(1000.0, 500.0, 2.0));

    let surface = driver.surface().expect("surface");
    assert_eq!(
        surface.commands.last(),
        Some(&DrawCommand::BackingSize {
            width: 2000,
            height: 1000,
            scale: 2.0,
        })
    );
    assert_eq!(driver.field().map(ParticleField::size), Some((1000.0, 500.0)));
}

#[test]
fn bogus_pixel_ratio_falls_back_to_one() {
    assert_eq!(Viewport::new(10.0, 10.0, 0.0).backing_size(), (10, 10));
    assert_eq!(Viewport::new(10.0, 10.0, f32::NAN).effective_ratio(), 1.0);
    assert_eq!(Viewport::new(10.0, 10.0, 1.5).backing_size(), (15, 15));
}

#[test]
fn missing_surface_degrades_to_no_op() {
    let mut driver: AnimationDriver<Rain, RecordingSurface> =
        AnimationDriver::new("rain", ParticleField::seeded(Rain::default(), 1), None, viewport());
    let mut frames = FrameQueue::new();
    let now = Instant::now();

    driver.set_active(true, now, &mut frames);
    driver.resize(viewport());
    driver.set_active(false, now, &mut frames);

    assert_eq!(driver.phase(), DriverPhase::Unavailable);
    assert!(!driver.is_active());
    assert!(frames.is_idle());
    assert!(driver.field().is_none());
}
