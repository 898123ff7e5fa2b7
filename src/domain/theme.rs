use crate::domain::weather::{CurrentConditions, wmo_code};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Good,
    Bad,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    Rain,
    Snow,
}

/// Visual state derived from one set of current conditions.
///
/// Built fresh on every data refresh and handed to the applier; nothing
/// holds on to it afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeDescriptor {
    pub mood: Mood,
    pub precipitation: Precipitation,
    pub cloudy: bool,
    pub cloud_heavy: bool,
    pub cloud_opacity: Option<f32>,
    pub cold: bool,
}

impl ThemeDescriptor {
    pub const NEUTRAL: Self = Self {
        mood: Mood::Neutral,
        precipitation: Precipitation::None,
        cloudy: false,
        cloud_heavy: false,
        cloud_opacity: None,
        cold: false,
    };

    pub fn is_neutral(&self) -> bool {
        self.mood == Mood::Neutral
    }
}

const GOOD_CODES: &[u8] = &[0, 1, 2];
const LIGHT_CLOUD_CODES: &[u8] = &[2];
const HEAVY_CLOUD_CODES: &[u8] = &[
    3, 45, 48, 51, 53, 55, 61, 63, 65, 71, 73, 75, 80, 81, 82, 95, 96, 99,
];
// 77, 85 and 86 are never requested from the provider today.
const SNOW_CODES: &[u8] = &[71, 73, 75, 77, 85, 86];
const RAIN_CODES: &[u8] = &[51, 53, 55, 61, 63, 65, 80, 81, 82, 95, 96, 99];

const CLOUD_OPACITY_FLOOR: f32 = 0.35;
const CLOUD_OPACITY_SPAN: f32 = 0.55;

#[must_use]
pub fn is_snow_code(code: u8) -> bool {
    SNOW_CODES.contains(&code)
}

#[must_use]
pub fn is_rain_code(code: u8) -> bool {
    RAIN_CODES.contains(&code)
}

#[must_use]
pub fn is_cloud_code(code: u8) -> bool {
    LIGHT_CLOUD_CODES.contains(&code) || HEAVY_CLOUD_CODES.contains(&code)
}

#[must_use]
pub fn is_heavy_cloud_code(code: u8) -> bool {
    HEAVY_CLOUD_CODES.contains(&code)
}

/// Maps cloud cover in percent onto the `[0.35, 0.90]` opacity band.
#[must_use]
pub fn cloud_opacity_for(cloud_cover_pct: f32) -> f32 {
    let clamped = cloud_cover_pct.clamp(0.0, 100.0);
    CLOUD_OPACITY_FLOOR + (clamped / 100.0) * CLOUD_OPACITY_SPAN
}

/// Derives the theme for one set of readings.
///
/// A missing or NaN code is neutral. Any other number gets a mood; numbers
/// that are not in the WMO tables resolve to a bad mood with no effects.
#[must_use]
pub fn resolve(
    code: Option<f64>,
    cloud_cover_pct: Option<f32>,
    temperature_c: Option<f32>,
) -> ThemeDescriptor {
    let Some(raw) = code.filter(|c| !c.is_nan()) else {
        return ThemeDescriptor::NEUTRAL;
    };
    let code = wmo_code(raw);
    let in_table = |check: fn(u8) -> bool| code.is_some_and(check);

    let mood = if in_table(|c| GOOD_CODES.contains(&c)) {
        Mood::Good
    } else {
        Mood::Bad
    };

    let cloudy = in_table(is_cloud_code);
    let cloud_opacity = cloud_cover_pct
        .filter(|pct| cloudy && !pct.is_nan())
        .map(cloud_opacity_for);

    // Snow wins so the two drivers can never both be asked to run.
    let precipitation = if in_table(is_snow_code) {
        Precipitation::Snow
    } else if in_table(is_rain_code) {
        Precipitation::Rain
    } else {
        Precipitation::None
    };

    ThemeDescriptor {
        mood,
        precipitation,
        cloudy,
        cloud_heavy: in_table(is_heavy_cloud_code),
        cloud_opacity,
        cold: temperature_c.is_some_and(|t| t < 0.0),
    }
}

#[must_use]
pub fn resolve_conditions(current: &CurrentConditions) -> ThemeDescriptor {
    resolve(
        current.weather_code,
        current.cloud_cover,
        current.temperature_2m_c,
    )
}
