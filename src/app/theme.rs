use std::time::Instant;

use tracing::info;

use crate::{
    app::{
        effects::EffectsContext,
        presentation::{PresentationSurface, SurfaceFlag},
    },
    domain::{
        theme::{Mood, Precipitation, ThemeDescriptor, resolve_conditions},
        weather::CurrentConditions,
    },
    fx::DrawingSurface,
};

/// Pushes a resolved theme onto the presentation surface and the two
/// precipitation drivers.
///
/// A neutral descriptor (no usable weather code) switches every effect off
/// regardless of its other fields.
pub fn apply_theme<S, P>(
    descriptor: &ThemeDescriptor,
    effects: &mut EffectsContext<S>,
    surface: &mut P,
    now: Instant,
) where
    S: DrawingSurface,
    P: PresentationSurface + ?Sized,
{
    surface.set_mood_class(Mood::Neutral);
    surface.set_flag(SurfaceFlag::Cloudy, false);
    surface.set_flag(SurfaceFlag::CloudHeavy, false);
    surface.set_cloud_opacity(None);

    if descriptor.is_neutral() {
        effects.stop_all(now);
        surface.set_flag(SurfaceFlag::Rainy, false);
        surface.set_flag(SurfaceFlag::Snowy, false);
        surface.set_flag(SurfaceFlag::Cold, false);
        info!("weather code unavailable, effects cleared");
        return;
    }

    surface.set_mood_class(descriptor.mood);
    surface.set_flag(SurfaceFlag::Cloudy, descriptor.cloudy);
    surface.set_flag(SurfaceFlag::CloudHeavy, descriptor.cloud_heavy);
    surface.set_cloud_opacity(descriptor.cloud_opacity);

    let precipitation = descriptor.precipitation;
    surface.set_flag(SurfaceFlag::Rainy, precipitation == Precipitation::Rain);
    surface.set_flag(SurfaceFlag::Snowy, precipitation == Precipitation::Snow);
    effects.set_precipitation(precipitation, now);

    surface.set_flag(SurfaceFlag::Cold, descriptor.cold);
    info!(
        mood = ?descriptor.mood,
        precipitation = ?precipitation,
        cloud_opacity = ?descriptor.cloud_opacity,
        cold = descriptor.cold,
        "theme applied"
    );
}

/// The per-refresh pipeline: resolve the current conditions, then apply.
pub fn on_weather_refresh<S, P>(
    current: &CurrentConditions,
    effects: &mut EffectsContext<S>,
    surface: &mut P,
    now: Instant,
) -> ThemeDescriptor
where
    S: DrawingSurface,
    P: PresentationSurface + ?Sized,
{
    let descriptor = resolve_conditions(current);
    apply_theme(&descriptor, effects, surface, now);
    descriptor
}
