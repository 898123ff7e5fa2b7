use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self {
            name: format!("{lat:.4}, {lon:.4}"),
            latitude: lat,
            longitude: lon,
        }
    }

    pub fn warsaw() -> Self {
        Self {
            name: "Warszawa".to_string(),
            latitude: 52.2297,
            longitude: 21.0122,
        }
    }
}

const QUICK_CITIES: &[(&str, f64, f64)] = &[
    ("Warszawa", 52.2297, 21.0122),
    ("Kraków", 50.0647, 19.9450),
    ("Gdańsk", 54.3520, 18.6466),
    ("Wrocław", 51.1079, 17.0385),
    ("Poznań", 52.4064, 16.9252),
];

/// Preset city in `slot`, bound to the number keys in order.
#[must_use]
pub fn quick_city(slot: usize) -> Option<Location> {
    QUICK_CITIES
        .get(slot)
        .map(|&(name, latitude, longitude)| Location {
            name: name.to_string(),
            latitude,
            longitude,
        })
}

#[must_use]
pub fn quick_city_count() -> usize {
    QUICK_CITIES.len()
}

/// The three current-condition metrics the theme pipeline consumes.
///
/// Every field is optional: the upstream provider may omit any of them and
/// the resolver treats a missing value as "flag not set". The weather code
/// is kept as the raw number; only table lookups need an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentConditions {
    pub weather_code: Option<f64>,
    pub cloud_cover: Option<f32>,
    pub temperature_2m_c: Option<f32>,
}

impl CurrentConditions {
    pub fn new(
        weather_code: Option<f64>,
        cloud_cover: Option<f32>,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            weather_code,
            cloud_cover,
            temperature_2m_c: temperature,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConditionsSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    pub fetched_at: DateTime<Utc>,
}

impl ConditionsSnapshot {
    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_minutes()
    }
}

/// Reads a weather code from a raw JSON value.
///
/// Numbers pass through and numeric strings are parsed after trimming, with
/// the empty string reading as zero. Anything that does not yield a number is
/// absent.
#[must_use]
pub fn weather_code_from_json(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    };
    number.filter(|v| !v.is_nan())
}

fn parse_numeric_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).ok().map(|v| v as f64);
        }
    }
    // `f64::from_str` also takes "inf" and "nan" spellings.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return None;
    }
    trimmed.parse().ok()
}

/// The WMO table entry for a code, when the number is one.
#[must_use]
pub fn wmo_code(code: f64) -> Option<u8> {
    if code.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&code) {
        return None;
    }
    Some(code as u8)
}

/// Drops NaN so downstream consumers only see usable metrics.
#[must_use]
pub fn numeric_metric(raw: Option<f64>) -> Option<f32> {
    raw.filter(|v| !v.is_nan()).map(|v| v as f32)
}

#[must_use]
pub fn weather_label(code: Option<f64>) -> &'static str {
    let Some(code) = code.and_then(wmo_code) else {
        return "Conditions";
    };
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snowfall",
        73 => "Moderate snowfall",
        75 => "Heavy snowfall",
        77 => "Snow grains",
        80 | 81 => "Rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Conditions",
    }
}
