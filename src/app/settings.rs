use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{cli::Cli, domain::weather::Location};

const DEFAULT_FPS: u8 = 30;
const DEFAULT_REFRESH_SECS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub fps: u8,
    pub animation: bool,
    pub pixel_ratio: f32,
    pub refresh_interval_secs: u64,
    pub location: Option<Location>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            animation: true,
            pixel_ratio: 1.0,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            location: None,
        }
    }
}

impl RuntimeSettings {
    pub fn from_cli_defaults(cli: &Cli) -> Self {
        Self {
            fps: cli.fps,
            animation: !cli.no_animation,
            pixel_ratio: cli.pixel_ratio,
            refresh_interval_secs: cli.refresh_interval,
            location: cli.location(),
        }
    }

    /// Applies every flag that differs from its CLI default.
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if cli.fps != DEFAULT_FPS {
            self.fps = cli.fps;
        }
        if cli.no_animation {
            self.animation = false;
        }
        if (cli.pixel_ratio - 1.0).abs() > f32::EPSILON {
            self.pixel_ratio = cli.pixel_ratio;
        }
        if cli.refresh_interval != DEFAULT_REFRESH_SECS {
            self.refresh_interval_secs = cli.refresh_interval;
        }
        if let Some(location) = cli.location() {
            self.location = Some(location);
        }
    }

    /// Saved files are hand-editable; out-of-range values fall back.
    fn sanitize(&mut self) {
        self.fps = self.fps.clamp(15, 60);
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            self.pixel_ratio = 1.0;
        }
        self.refresh_interval_secs = self.refresh_interval_secs.max(10);
    }
}

pub fn load_runtime_settings(cli: &Cli, enable_disk: bool) -> (RuntimeSettings, Option<PathBuf>) {
    let path = if enable_disk { settings_path() } else { None };
    let settings = load_runtime_settings_from(cli, path.as_deref());
    (settings, path)
}

pub fn load_runtime_settings_from(cli: &Cli, path: Option<&Path>) -> RuntimeSettings {
    let Some(path) = path else {
        return RuntimeSettings::from_cli_defaults(cli);
    };

    let mut settings = match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<RuntimeSettings>(&content).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "ignoring unreadable settings file");
            RuntimeSettings::default()
        }),
        Err(_) => RuntimeSettings::default(),
    };
    settings.apply_cli_overrides(cli);
    settings.sanitize();
    settings
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload =
        serde_json::to_string_pretty(settings).context("serializing settings payload failed")?;
    fs::write(path, payload).context("writing settings file failed")
}

fn settings_path() -> Option<PathBuf> {
    if let Some(base) = std::env::var_os("WEATHER_FX_CONFIG_DIR") {
        return Some(PathBuf::from(base).join("settings.json"));
    }

    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("weather-fx")
            .join("settings.json"),
    )
}

#[cfg(test)]
mod tests;
