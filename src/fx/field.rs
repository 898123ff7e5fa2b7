use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::fx::surface::{DrawingSurface, Point};

/// Simulation speeds are tuned for a 16 ms frame.
pub const FRAME_MS: f32 = 16.0;

/// Horizontal slack before a particle is pulled back onto the surface.
const HORIZONTAL_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSettings {
    pub min_count: usize,
    pub max_count: usize,
    pub density_divisor: f32,
    pub wind: f32,
    pub recycle_band: f32,
}

/// Motion state every particle kind shares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub drift: f32,
    pub opacity: f32,
}

#[must_use]
pub fn lerp(start: f32, end: f32, amount: f32) -> f32 {
    start + (end - start) * amount
}

/// One flavour of particle: how it is born, how it sways, and how it draws.
///
/// The field owns the common fall/drift/recycle loop; kinds only add what is
/// specific to them. Kind values may carry extra transient state (rain keeps
/// its splashes here).
pub trait ParticleKind: fmt::Debug {
    type Particle: fmt::Debug + Clone;

    const SETTINGS: FieldSettings;

    /// Builds a particle at `origin`, deriving every parameter from `depth`.
    fn spawn<R: Rng + ?Sized>(&self, depth: f32, origin: Point, rng: &mut R) -> Self::Particle;

    fn body(particle: &Self::Particle) -> &Body;

    fn body_mut(particle: &mut Self::Particle) -> &mut Body;

    /// How far below the bottom edge the particle may travel before recycling.
    fn vertical_extent(particle: &Self::Particle) -> f32;

    /// Extra horizontal offset for this tick, added after wind and drift.
    fn sway(_particle: &mut Self::Particle, _delta_ms: f32) -> f32 {
        0.0
    }

    /// Called with the particle's final body just before it is recycled.
    fn on_recycle<R: Rng + ?Sized>(&mut self, _exited: &Body, _height: f32, _rng: &mut R) {}

    fn tick_effects(&mut self, _delta_ms: f32) {}

    fn reset_effects(&mut self) {}

    fn draw_haze<S: DrawingSurface + ?Sized>(&self, surface: &mut S, width: f32, height: f32);

    fn draw_particle<S: DrawingSurface + ?Sized>(&self, surface: &mut S, particle: &Self::Particle);

    fn draw_effects<S: DrawingSurface + ?Sized>(&self, _surface: &mut S) {}
}

#[derive(Debug)]
pub struct ParticleField<K: ParticleKind, R: Rng = StdRng> {
    kind: K,
    width: f32,
    height: f32,
    particles: Vec<K::Particle>,
    rng: R,
}

impl<K: ParticleKind> ParticleField<K> {
    pub fn new(kind: K) -> Self {
        Self::with_rng(kind, StdRng::from_os_rng())
    }

    pub fn seeded(kind: K, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }
}

impl<K: ParticleKind, R: Rng> ParticleField<K, R> {
    /// An empty field; nothing is simulated until the first `resize`.
    pub fn with_rng(kind: K, rng: R) -> Self {
        Self {
            kind,
            width: 0.0,
            height: 0.0,
            particles: Vec::new(),
            rng,
        }
    }

    #[must_use]
    pub fn target_count(width: f32, height: f32) -> usize {
        let settings = K::SETTINGS;
        let area = (width.max(0.0) * height.max(0.0)) / settings.density_divisor;
        (area.round() as usize).clamp(settings.min_count, settings.max_count)
    }

    /// Rebuilds the particle set from scratch for a `width` x `height` surface.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.kind.reset_effects();

        let target = Self::target_count(self.width, self.height);
        let mut particles = Vec::with_capacity(target);
        for _ in 0..target {
            let depth = self.rng.random::<f32>();
            let origin = Point::new(
                self.rng.random::<f32>() * self.width,
                self.rng.random::<f32>() * self.height,
            );
            particles.push(self.kind.spawn(depth, origin, &mut self.rng));
        }
        self.particles = particles;
    }

    pub fn tick(&mut self, delta_ms: f32) {
        let settings = K::SETTINGS;
        let step = delta_ms / FRAME_MS;
        let (width, height) = (self.width, self.height);

        for particle in &mut self.particles {
            let sway = K::sway(particle, delta_ms);
            let extent = K::vertical_extent(particle);
            let body = K::body_mut(particle);
            body.y += body.speed * step;
            body.x += (settings.wind + body.drift) * step + sway;

            if body.y > height + extent {
                self.kind.on_recycle(body, height, &mut self.rng);
                body.x = self.rng.random::<f32>() * width;
                body.y = -self.rng.random::<f32>() * height * settings.recycle_band;
            }
            if body.x < -HORIZONTAL_MARGIN || body.x > width + HORIZONTAL_MARGIN {
                body.x = self.rng.random::<f32>() * width;
            }
        }

        self.kind.tick_effects(delta_ms);
    }

    pub fn render<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        surface.clear();
        self.kind.draw_haze(surface, self.width, self.height);
        for particle in &self.particles {
            self.kind.draw_particle(surface, particle);
        }
        self.kind.draw_effects(surface);
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn particles(&self) -> &[K::Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
