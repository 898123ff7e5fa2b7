use std::f32::consts::TAU;

use rand::Rng;

use crate::fx::{
    field::{Body, FieldSettings, ParticleField, ParticleKind, lerp},
    surface::{DrawingSurface, PixelRect, Point, Rgba},
};

pub type SnowField = ParticleField<Snow>;

const RADIUS: (f32, f32) = (1.2, 3.8);
const SPEED: (f32, f32) = (0.6, 2.1);
const OPACITY: (f32, f32) = (0.35, 0.9);
const DRIFT: (f32, f32) = (-0.45, 0.7);
const WOBBLE_SPEED: (f32, f32) = (0.002, 0.01);
const WOBBLE_AMPLITUDE: f32 = 0.4;

const FLAKE_COLOR: Rgba = Rgba::new(240, 248, 255, 1.0);

#[derive(Debug, Clone, PartialEq)]
pub struct Flake {
    pub body: Body,
    pub radius: f32,
    pub wobble: f32,
    pub wobble_speed: f32,
}

#[derive(Debug, Default)]
pub struct Snow;

fn depth_lerp((min, max): (f32, f32), depth: f32) -> f32 {
    lerp(min, max, depth)
}

impl ParticleKind for Snow {
    type Particle = Flake;

    const SETTINGS: FieldSettings = FieldSettings {
        min_count: 160,
        max_count: 360,
        density_divisor: 7000.0,
        wind: 0.25,
        recycle_band: 0.3,
    };

    fn spawn<R: Rng + ?Sized>(&self, depth: f32, origin: Point, rng: &mut R) -> Flake {
        Flake {
            body: Body {
                x: origin.x,
                y: origin.y,
                speed: depth_lerp(SPEED, depth),
                drift: depth_lerp(DRIFT, depth),
                opacity: depth_lerp(OPACITY, depth),
            },
            radius: depth_lerp(RADIUS, depth),
            // Wobble takes its own draws, not depth.
            wobble: rng.random::<f32>() * TAU,
            wobble_speed: depth_lerp(WOBBLE_SPEED, rng.random::<f32>()),
        }
    }

    fn body(particle: &Flake) -> &Body {
        &particle.body
    }

    fn body_mut(particle: &mut Flake) -> &mut Body {
        &mut particle.body
    }

    fn vertical_extent(particle: &Flake) -> f32 {
        particle.radius
    }

    fn sway(flake: &mut Flake, delta_ms: f32) -> f32 {
        flake.wobble += flake.wobble_speed * delta_ms;
        flake.wobble.sin() * WOBBLE_AMPLITUDE
    }

    fn draw_haze<S: DrawingSurface + ?Sized>(&self, surface: &mut S, width: f32, height: f32) {
        surface.fill_vertical_gradient(
            PixelRect {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            Rgba::new(255, 255, 255, 0.02),
            Rgba::new(210, 235, 255, 0.08),
        );
    }

    fn draw_particle<S: DrawingSurface + ?Sized>(&self, surface: &mut S, flake: &Flake) {
        surface.fill_circle(
            Point::new(flake.body.x, flake.body.y),
            flake.radius,
            FLAKE_COLOR.with_alpha(flake.body.opacity),
        );
    }
}
