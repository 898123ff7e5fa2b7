use std::time::Instant;

use tracing::debug;

use crate::fx::{
    field::{ParticleField, ParticleKind},
    frames::{FrameScheduler, FrameToken},
    surface::DrawingSurface,
};

/// Upper bound for one simulation step, so a backgrounded host does not
/// make particles jump when it comes back.
pub const MAX_FRAME_DELTA_MS: f32 = 34.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    pub fn effective_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }

    /// Physical pixel size of the surface backing this viewport.
    pub fn backing_size(&self) -> (u32, u32) {
        let ratio = self.effective_ratio();
        (
            (self.width.max(0.0) * ratio).round() as u32,
            (self.height.max(0.0) * ratio).round() as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    /// No surface to draw on; every call is accepted and ignored.
    Unavailable,
    Idle,
    Active,
}

#[derive(Debug)]
struct Stage<K: ParticleKind, S> {
    field: ParticleField<K>,
    surface: S,
    active: bool,
    last_frame: Option<Instant>,
    pending: Option<FrameToken>,
}

/// Runs one particle field on one surface: owns the active flag, the frame
/// loop, and the reaction to viewport changes.
#[derive(Debug)]
pub struct AnimationDriver<K: ParticleKind, S: DrawingSurface> {
    name: &'static str,
    stage: Option<Stage<K, S>>,
}

impl<K: ParticleKind, S: DrawingSurface> AnimationDriver<K, S> {
    /// Builds the driver and sizes the field for `viewport` right away.
    ///
    /// Without a surface the driver degrades to a no-op: effects are an
    /// enhancement, never a reason to fail.
    pub fn new(
        name: &'static str,
        field: ParticleField<K>,
        surface: Option<S>,
        viewport: Viewport,
    ) -> Self {
        let Some(surface) = surface else {
            debug!(driver = name, "no drawing surface, effects disabled");
            return Self::unavailable(name);
        };

        let mut driver = Self {
            name,
            stage: Some(Stage {
                field,
                surface,
                active: false,
                last_frame: None,
                pending: None,
            }),
        };
        driver.resize(viewport);
        driver
    }

    pub fn unavailable(name: &'static str) -> Self {
        Self { name, stage: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> DriverPhase {
        match &self.stage {
            None => DriverPhase::Unavailable,
            Some(stage) if stage.active => DriverPhase::Active,
            Some(_) => DriverPhase::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        self.phase() == DriverPhase::Active
    }

    pub fn pending_frame(&self) -> Option<FrameToken> {
        self.stage.as_ref().and_then(|stage| stage.pending)
    }

    pub fn owns(&self, token: FrameToken) -> bool {
        self.pending_frame() == Some(token)
    }

    pub fn field(&self) -> Option<&ParticleField<K>> {
        self.stage.as_ref().map(|stage| &stage.field)
    }

    pub fn surface(&self) -> Option<&S> {
        self.stage.as_ref().map(|stage| &stage.surface)
    }

    pub fn set_active<F: FrameScheduler + ?Sized>(
        &mut self,
        active: bool,
        now: Instant,
        frames: &mut F,
    ) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        if stage.active == active {
            return;
        }
        stage.active = active;

        if active {
            stage.last_frame = Some(now);
            if stage.pending.is_none() {
                stage.pending = Some(frames.request_frame());
            }
            debug!(driver = self.name, particles = stage.field.len(), "effect started");
        } else {
            if let Some(token) = stage.pending.take() {
                frames.cancel_frame(token);
            }
            stage.surface.clear();
            debug!(driver = self.name, "effect stopped");
        }
    }

    /// Runs one scheduled repaint. Tokens this driver no longer waits for
    /// are ignored.
    pub fn on_frame<F: FrameScheduler + ?Sized>(
        &mut self,
        token: FrameToken,
        now: Instant,
        frames: &mut F,
    ) -> bool {
        let Some(stage) = self.stage.as_mut() else {
            return false;
        };
        if stage.pending != Some(token) {
            return false;
        }
        stage.pending = None;
        if !stage.active {
            return false;
        }

        let last = stage.last_frame.unwrap_or(now);
        let delta_ms = (now.saturating_duration_since(last).as_secs_f32() * 1000.0)
            .min(MAX_FRAME_DELTA_MS);
        stage.last_frame = Some(now);

        stage.field.tick(delta_ms);
        stage.field.render(&mut stage.surface);
        stage.pending = Some(frames.request_frame());
        true
    }

    /// Resizes the backing surface for the viewport's pixel density and
    /// rebuilds the field.
    pub fn resize(&mut self, viewport: Viewport) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let (backing_width, backing_height) = viewport.backing_size();
        stage
            .surface
            .set_backing_size(backing_width, backing_height, viewport.effective_ratio());
        stage.field.resize(viewport.width, viewport.height);
        debug!(
            driver = self.name,
            width = viewport.width,
            height = viewport.height,
            particles = stage.field.len(),
            "field rebuilt"
        );
    }
}

#[cfg(test)]
mod tests;
