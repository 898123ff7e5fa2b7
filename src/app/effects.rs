use std::time::Instant;

use tracing::debug;

use crate::{
    domain::theme::Precipitation,
    fx::{
        AnimationDriver, DrawingSurface, FrameQueue, ParticleField, Rain, Snow, Viewport,
        driver::DriverPhase,
    },
    timing::debounce::{Debouncer, RESIZE_DEBOUNCE},
};

/// Everything the theme pipeline drives: one rain driver, one snow driver,
/// the frame queue they share, and the pending viewport change.
///
/// Created once per session and passed explicitly; the two drivers never
/// touch each other's state.
#[derive(Debug)]
pub struct EffectsContext<S: DrawingSurface> {
    rain: AnimationDriver<Rain, S>,
    snow: AnimationDriver<Snow, S>,
    frames: FrameQueue,
    resize: Debouncer<Viewport>,
}

impl<S: DrawingSurface> EffectsContext<S> {
    pub fn new(rain_surface: Option<S>, snow_surface: Option<S>, viewport: Viewport) -> Self {
        Self::from_drivers(
            AnimationDriver::new(
                "rain",
                ParticleField::new(Rain::default()),
                rain_surface,
                viewport,
            ),
            AnimationDriver::new("snow", ParticleField::new(Snow), snow_surface, viewport),
        )
    }

    pub fn from_drivers(rain: AnimationDriver<Rain, S>, snow: AnimationDriver<Snow, S>) -> Self {
        Self {
            rain,
            snow,
            frames: FrameQueue::new(),
            resize: Debouncer::new(RESIZE_DEBOUNCE),
        }
    }

    pub fn rain(&self) -> &AnimationDriver<Rain, S> {
        &self.rain
    }

    pub fn snow(&self) -> &AnimationDriver<Snow, S> {
        &self.snow
    }

    pub fn active_precipitation(&self) -> Precipitation {
        match (self.rain.phase(), self.snow.phase()) {
            (DriverPhase::Active, _) => Precipitation::Rain,
            (_, DriverPhase::Active) => Precipitation::Snow,
            _ => Precipitation::None,
        }
    }

    /// Runs the driver matching `precipitation` and stops the other. The
    /// stop always happens first so both are never active together.
    pub fn set_precipitation(&mut self, precipitation: Precipitation, now: Instant) {
        let rain = precipitation == Precipitation::Rain;
        let snow = precipitation == Precipitation::Snow;
        if !rain {
            self.rain.set_active(false, now, &mut self.frames);
        }
        if !snow {
            self.snow.set_active(false, now, &mut self.frames);
        }
        if rain {
            self.rain.set_active(true, now, &mut self.frames);
        }
        if snow {
            self.snow.set_active(true, now, &mut self.frames);
        }
    }

    pub fn stop_all(&mut self, now: Instant) {
        self.set_precipitation(Precipitation::None, now);
    }

    /// Records a viewport change; it takes effect once resizing has been
    /// quiet for the debounce window.
    pub fn viewport_changed(&mut self, viewport: Viewport, now: Instant) {
        self.resize.signal(viewport, now);
    }

    /// Resizes immediately, bypassing the debouncer.
    pub fn resize_now(&mut self, viewport: Viewport) {
        self.rain.resize(viewport);
        self.snow.resize(viewport);
    }

    /// Applies the viewport change once the debounce window has passed.
    /// Returns true when a resize happened.
    pub fn apply_pending_resize(&mut self, now: Instant) -> bool {
        let Some(viewport) = self.resize.poll(now) else {
            return false;
        };
        debug!(
            width = viewport.width,
            height = viewport.height,
            "applying settled resize"
        );
        self.resize_now(viewport);
        true
    }

    /// One display refresh: applies a settled viewport change, then fires
    /// every due frame. Returns how many drivers repainted.
    pub fn pump(&mut self, now: Instant) -> usize {
        self.apply_pending_resize(now);

        let mut painted = 0;
        for token in self.frames.take_due() {
            let fired = if self.rain.owns(token) {
                self.rain.on_frame(token, now, &mut self.frames)
            } else if self.snow.owns(token) {
                self.snow.on_frame(token, now, &mut self.frames)
            } else {
                false
            };
            painted += usize::from(fired);
        }
        painted
    }

    /// True when no driver has a repaint scheduled.
    pub fn is_idle(&self) -> bool {
        self.frames.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fx::RecordingSurface;

    fn context() -> EffectsContext<RecordingSurface> {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        EffectsContext::from_drivers(
            AnimationDriver::new(
                "rain",
                ParticleField::seeded(Rain::default(), 1),
                Some(RecordingSurface::new()),
                viewport,
            ),
            AnimationDriver::new(
                "snow",
                ParticleField::seeded(Snow, 2),
                Some(RecordingSurface::new()),
                viewport,
            ),
        )
    }

    #[test]
    fn switching_precipitation_never_overlaps() {
        let mut ctx = context();
        let now = Instant::now();

        ctx.set_precipitation(Precipitation::Snow, now);
        assert_eq!(ctx.active_precipitation(), Precipitation::Snow);

        ctx.set_precipitation(Precipitation::Rain, now);
        assert!(ctx.rain().is_active());
        assert!(!ctx.snow().is_active());

        ctx.stop_all(now);
        assert_eq!(ctx.active_precipitation(), Precipitation::None);
        assert!(ctx.is_idle());
    }

    #[test]
    fn pump_repaints_only_active_driver() {
        let mut ctx = context();
        let start = Instant::now();
        ctx.set_precipitation(Precipitation::Rain, start);

        assert_eq!(ctx.pump(start + Duration::from_millis(16)), 1);
        assert_eq!(ctx.pump(start + Duration::from_millis(32)), 1);
        assert_eq!(ctx.snow().surface().map(RecordingSurface::clears), Some(0));
    }

    #[test]
    fn idle_context_does_no_work() {
        let mut ctx = context();
        assert!(ctx.is_idle());
        assert_eq!(ctx.pump(Instant::now()), 0);
    }

    #[test]
    fn resize_waits_for_debounce_window() {
        let mut ctx = context();
        let start = Instant::now();

        ctx.viewport_changed(Viewport::new(1000.0, 700.0, 1.0), start);
        let later = start + Duration::from_millis(60);
        ctx.viewport_changed(Viewport::new(3000.0, 2000.0, 1.0), later);
        ctx.pump(start + Duration::from_millis(100));
        assert_eq!(ctx.rain().field().map(ParticleField::size), Some((800.0, 600.0)));

        ctx.pump(start + Duration::from_millis(180));
        assert_eq!(ctx.rain().field().map(ParticleField::size), Some((3000.0, 2000.0)));
        assert_eq!(ctx.snow().field().map(ParticleField::len), Some(360));
    }

    #[test]
    fn settled_resize_applies_without_frames() {
        let mut ctx = context();
        let start = Instant::now();

        ctx.viewport_changed(Viewport::new(1600.0, 900.0, 1.0), start);
        assert!(!ctx.apply_pending_resize(start + Duration::from_millis(119)));
        assert!(ctx.apply_pending_resize(start + Duration::from_millis(120)));
        assert!(!ctx.apply_pending_resize(start + Duration::from_millis(240)));

        assert!(ctx.is_idle());
        assert_eq!(ctx.rain().field().map(ParticleField::size), Some((1600.0, 900.0)));
        assert_eq!(ctx.snow().field().map(ParticleField::size), Some((1600.0, 900.0)));
    }
}
