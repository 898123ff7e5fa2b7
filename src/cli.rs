#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::Parser;

use crate::domain::weather::{CurrentConditions, Location};

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "weather-fx",
    version,
    about = "Weather-driven rain and snow in your terminal"
)]
pub struct Cli {
    /// Latitude (requires --lon; default: Warszawa)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Display name for the location
    #[arg(long)]
    pub name: Option<String>,

    /// City to look up by name
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub city: Option<String>,

    /// Static WMO weather code; skips the network
    #[arg(long, allow_hyphen_values = true)]
    pub code: Option<f64>,

    /// Static cloud cover percentage
    #[arg(long, allow_hyphen_values = true)]
    pub cloud_cover: Option<f32>,

    /// Static temperature in °C
    #[arg(long, allow_hyphen_values = true)]
    pub temp: Option<f32>,

    /// Target FPS (15..60)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(15..=60))]
    pub fps: u8,

    /// Start with the particle animation paused
    #[arg(long)]
    pub no_animation: bool,

    /// Backing pixels per logical pixel
    #[arg(long, default_value_t = 1.0)]
    pub pixel_ratio: f32,

    /// Forecast endpoint override
    #[arg(long)]
    pub forecast_url: Option<String>,

    /// Geocoding endpoint override
    #[arg(long)]
    pub geocode_url: Option<String>,

    /// Refresh interval in seconds
    #[arg(long, default_value_t = 600)]
    pub refresh_interval: u64,

    /// Write logs to this file (RUST_LOG filters)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            _ => {}
        }
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            anyhow::bail!("--pixel-ratio must be a positive number");
        }
        if self.city.as_deref().is_some_and(|c| c.trim().is_empty()) {
            anyhow::bail!("--city must not be empty");
        }
        Ok(())
    }

    /// True when any of the static condition flags is present.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.code.is_some() || self.cloud_cover.is_some() || self.temp.is_some()
    }

    #[must_use]
    pub fn static_conditions(&self) -> Option<CurrentConditions> {
        self.is_static().then(|| {
            CurrentConditions::new(
                self.code.filter(|v| !v.is_nan()),
                self.cloud_cover.filter(|v| !v.is_nan()),
                self.temp.filter(|v| !v.is_nan()),
            )
        })
    }

    /// The location given on the command line, if any.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        let (lat, lon) = (self.lat?, self.lon?);
        let mut location = Location::from_coords(lat, lon);
        if let Some(name) = &self.name {
            location.name.clone_from(name);
        }
        Some(location)
    }

    /// The trimmed `--city` query, if one was given.
    #[must_use]
    pub fn city_query(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_are_live_mode_at_thirty_fps() {
        let cli = Cli::parse_from(["weather-fx"]);
        assert_eq!(cli.fps, 30);
        assert!(!cli.is_static());
        assert!(cli.static_conditions().is_none());
        assert!(cli.location().is_none());
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn static_flags_build_conditions() {
        let cli = Cli::parse_from(["weather-fx", "--code", "95", "--temp", "-5"]);
        let current = cli.static_conditions().expect("static mode");
        assert_eq!(current.weather_code, Some(95.0));
        assert_eq!(current.cloud_cover, None);
        assert_eq!(current.temperature_2m_c, Some(-5.0));
    }

    #[test]
    fn static_code_accepts_any_number() {
        let cli = Cli::parse_from(["weather-fx", "--code", "-1"]);
        let current = cli.static_conditions().expect("static mode");
        assert_eq!(current.weather_code, Some(-1.0));

        let cli = Cli::parse_from(["weather-fx", "--code", "2.5"]);
        assert_eq!(cli.static_conditions().map(|c| c.weather_code), Some(Some(2.5)));
    }

    #[test]
    fn city_conflicts_with_coordinates() {
        assert!(
            Cli::try_parse_from(["weather-fx", "--city", "Kraków", "--lat", "50", "--lon", "19"])
                .is_err()
        );
        let cli = Cli::parse_from(["weather-fx", "--city", "  Gdańsk "]);
        assert_eq!(cli.city_query(), Some("Gdańsk"));
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn blank_city_is_rejected() {
        let cli = Cli::parse_from(["weather-fx", "--city", "  "]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_fps() {
        assert!(Cli::try_parse_from(["weather-fx", "--fps", "90"]).is_err());
        assert!(Cli::try_parse_from(["weather-fx", "--fps", "10"]).is_err());
    }

    #[test]
    fn lat_requires_lon() {
        let cli = Cli::parse_from(["weather-fx", "--lat", "59.3"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_pixel_ratio() {
        let cli = Cli::parse_from(["weather-fx", "--pixel-ratio", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn name_overrides_coordinate_label() {
        let cli = Cli::parse_from([
            "weather-fx",
            "--lat",
            "59.3293",
            "--lon",
            "18.0686",
            "--name",
            "Stockholm",
        ]);
        let location = cli.location().expect("location");
        assert_eq!(location.name, "Stockholm");
        assert!((location.latitude - 59.3293).abs() < 1e-9);
    }
}
