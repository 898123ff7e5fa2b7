use rand::Rng;

use crate::fx::{
    field::{Body, FieldSettings, ParticleField, ParticleKind, lerp},
    surface::{DrawingSurface, PixelRect, Point, Rgba},
};

pub type RainField = ParticleField<Rain>;

const LENGTH: (f32, f32) = (10.0, 28.0);
const SPEED: (f32, f32) = (6.0, 18.0);
const THICKNESS: (f32, f32) = (0.6, 1.6);
const OPACITY: (f32, f32) = (0.15, 0.55);
const DRIFT: (f32, f32) = (-0.4, -1.2);

const SPLASH_CHANCE: f64 = 0.45;
const SPLASH_TTL_MS: (f32, f32) = (260.0, 420.0);
const SPLASH_GROWTH_PER_MS: f32 = 0.05;
const SPLASH_LIFT: f32 = 6.0;
const SPLASH_PEAK_ALPHA: f32 = 0.45;

const STREAK_SLANT: f32 = 8.0;
const HAZE_START: f32 = 0.6;

const DROP_COLOR: Rgba = Rgba::new(200, 220, 255, 1.0);
const SPLASH_COLOR: Rgba = Rgba::new(180, 210, 240, 1.0);

#[derive(Debug, Clone, PartialEq)]
pub struct RainDrop {
    pub body: Body,
    pub length: f32,
    pub thickness: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Splash {
    pub x: f32,
    pub y: f32,
    pub life: f32,
    pub ttl: f32,
    pub radius: f32,
}

impl Splash {
    pub fn progress(&self) -> f32 {
        (self.life / self.ttl).min(1.0)
    }
}

#[derive(Debug, Default)]
pub struct Rain {
    splashes: Vec<Splash>,
}

impl Rain {
    pub fn splashes(&self) -> &[Splash] {
        &self.splashes
    }
}

fn depth_lerp((min, max): (f32, f32), depth: f32) -> f32 {
    lerp(min, max, depth)
}

impl ParticleKind for Rain {
    type Particle = RainDrop;

    const SETTINGS: FieldSettings = FieldSettings {
        min_count: 140,
        max_count: 480,
        density_divisor: 4500.0,
        wind: -0.7,
        recycle_band: 0.4,
    };

    fn spawn<R: Rng + ?Sized>(&self, depth: f32, origin: Point, _rng: &mut R) -> RainDrop {
        RainDrop {
            body: Body {
                x: origin.x,
                y: origin.y,
                speed: depth_lerp(SPEED, depth),
                drift: depth_lerp(DRIFT, depth),
                opacity: depth_lerp(OPACITY, depth),
            },
            length: depth_lerp(LENGTH, depth),
            thickness: depth_lerp(THICKNESS, depth),
        }
    }

    fn body(particle: &RainDrop) -> &Body {
        &particle.body
    }

    fn body_mut(particle: &mut RainDrop) -> &mut Body {
        &mut particle.body
    }

    fn vertical_extent(particle: &RainDrop) -> f32 {
        particle.length
    }

    fn on_recycle<R: Rng + ?Sized>(&mut self, exited: &Body, height: f32, rng: &mut R) {
        if !rng.random_bool(SPLASH_CHANCE) {
            return;
        }
        self.splashes.push(Splash {
            x: exited.x,
            y: height - SPLASH_LIFT,
            life: 0.0,
            ttl: depth_lerp(SPLASH_TTL_MS, rng.random::<f32>()),
            radius: 0.0,
        });
    }

    fn tick_effects(&mut self, delta_ms: f32) {
        for splash in &mut self.splashes {
            splash.life += delta_ms;
            splash.radius += delta_ms * SPLASH_GROWTH_PER_MS;
        }
        self.splashes.retain(|splash| splash.life < splash.ttl);
    }

    fn reset_effects(&mut self) {
        self.splashes.clear();
    }

    fn draw_haze<S: DrawingSurface + ?Sized>(&self, surface: &mut S, width: f32, height: f32) {
        let top = height * HAZE_START;
        surface.fill_vertical_gradient(
            PixelRect {
                x: 0.0,
                y: top,
                width,
                height: height - top,
            },
            Rgba::new(255, 255, 255, 0.0),
            Rgba::new(255, 255, 255, 0.08),
        );
    }

    fn draw_particle<S: DrawingSurface + ?Sized>(&self, surface: &mut S, drop: &RainDrop) {
        let from = Point::new(drop.body.x, drop.body.y);
        let to = Point::new(
            drop.body.x + Self::SETTINGS.wind * STREAK_SLANT,
            drop.body.y + drop.length,
        );
        surface.stroke_line(from, to, drop.thickness, DROP_COLOR.with_alpha(drop.body.opacity));
    }

    fn draw_effects<S: DrawingSurface + ?Sized>(&self, surface: &mut S) {
        for splash in &self.splashes {
            let alpha = SPLASH_PEAK_ALPHA * (1.0 - splash.progress());
            surface.stroke_ellipse(
                Point::new(splash.x, splash.y),
                splash.radius,
                splash.radius * 0.4,
                1.0,
                SPLASH_COLOR.with_alpha(alpha),
            );
        }
    }
}
