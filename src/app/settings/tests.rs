use clap::Parser;
use tempfile::NamedTempFile;

use super::{
    RuntimeSettings, load_runtime_settings, load_runtime_settings_from, save_runtime_settings,
};
use crate::{cli::Cli, domain::weather::Location};

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("weather-fx").chain(args.iter().copied()))
}

#[test]
fn from_cli_defaults_maps_flags() {
    let settings = RuntimeSettings::from_cli_defaults(&cli(&[
        "--fps",
        "45",
        "--no-animation",
        "--pixel-ratio",
        "2",
    ]));

    assert_eq!(settings.fps, 45);
    assert!(!settings.animation);
    assert!((settings.pixel_ratio - 2.0).abs() < f32::EPSILON);
    assert_eq!(settings.refresh_interval_secs, 600);
    assert!(settings.location.is_none());
}

#[test]
fn without_disk_returns_cli_defaults() {
    let (settings, path) = load_runtime_settings(&cli(&[]), false);
    assert!(path.is_none());
    assert_eq!(settings, RuntimeSettings::default());
}

#[test]
fn saved_settings_are_restored() {
    let saved = RuntimeSettings {
        fps: 20,
        animation: false,
        location: Some(Location::warsaw()),
        ..RuntimeSettings::default()
    };
    let file = NamedTempFile::new().expect("create temp settings file");
    save_runtime_settings(file.path(), &saved).expect("save settings");

    let loaded = load_runtime_settings_from(&cli(&[]), Some(file.path()));
    assert_eq!(loaded, saved);
}

#[test]
fn explicit_flags_beat_saved_values() {
    let saved = RuntimeSettings {
        fps: 20,
        refresh_interval_secs: 900,
        location: Some(Location::warsaw()),
        ..RuntimeSettings::default()
    };
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("nested").join("settings.json");
    save_runtime_settings(&path, &saved).expect("save settings");

    let loaded = load_runtime_settings_from(
        &cli(&["--fps", "50", "--lat", "59.3293", "--lon", "18.0686"]),
        Some(&path),
    );

    assert_eq!(loaded.fps, 50);
    assert_eq!(loaded.refresh_interval_secs, 900);
    let location = loaded.location.expect("location");
    assert!((location.latitude - 59.3293).abs() < 1e-9);
}

#[test]
fn corrupt_or_hand_edited_files_fall_back() {
    let file = NamedTempFile::new().expect("create temp settings file");
    std::fs::write(file.path(), "{ not json").expect("write");
    assert_eq!(
        load_runtime_settings_from(&cli(&[]), Some(file.path())),
        RuntimeSettings::default()
    );

    std::fs::write(file.path(), r#"{ "fps": 240, "pixel_ratio": -3.0 }"#).expect("write");
    let loaded = load_runtime_settings_from(&cli(&[]), Some(file.path()));
    assert_eq!(loaded.fps, 60);
    assert!((loaded.pixel_ratio - 1.0).abs() < f32::EPSILON);
    assert!(loaded.animation);
}

#[test]
fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let loaded = load_runtime_settings_from(&cli(&[]), Some(&dir.path().join("absent.json")));
    assert_eq!(loaded, RuntimeSettings::default());
}
