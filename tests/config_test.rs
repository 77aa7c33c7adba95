//! Integration tests for Settings loading with layered merge semantics.
//!
//! Merge semantics: every layer replaces the fields it specifies and keeps the
//! rest (defaults < global < local < env).
//!
//! These tests use temp project directories only; the env layer is covered in
//! `config_env_test.rs`, which runs in its own process.

use std::fs;

use rstest::rstest;
use tempfile::TempDir;

use rsviz::application::ApplicationError;
use rsviz::config::{local_config_path, ChartSettings, RawSettings, Settings};

fn project_with_config(content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), content).unwrap();
    dir
}

#[test]
fn given_local_config_when_load_then_overrides_only_specified_fields() {
    // Arrange
    let project = project_with_config(
        r#"
output_dir = "charts"

[chart]
width = 800
fill = "tomato"
"#,
    );

    // Act
    let settings = Settings::load(Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.output_dir.to_str(), Some("charts"));
    assert_eq!(settings.chart.width, 800.0);
    assert_eq!(settings.chart.fill, "tomato");
    let defaults = ChartSettings::default();
    assert_eq!(settings.chart.height, defaults.height);
    assert_eq!(settings.chart.label_key, defaults.label_key);
    assert_eq!(settings.chart.ticks, defaults.ticks);
}

#[test]
fn given_no_local_config_when_load_then_defaults() {
    let project = TempDir::new().unwrap();

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.chart.padding, ChartSettings::default().padding);
    assert!(settings.chart.title.is_none());
}

#[rstest]
#[case::broken_toml("[chart\nwidth = 1")]
#[case::wrong_type("[chart]\nwidth = \"wide\"")]
fn given_invalid_local_config_when_load_then_config_error(#[case] content: &str) {
    let project = project_with_config(content);

    let err = Settings::load(Some(project.path())).unwrap_err();

    match err {
        ApplicationError::Config { message } => {
            assert!(message.contains(".rsviz.toml"), "message: {message}")
        }
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn given_output_dir_with_variable_when_load_then_expanded() {
    let home = std::env::var("HOME").unwrap_or_default();
    let project = project_with_config("output_dir = \"$HOME/charts\"\n");

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.output_dir, std::path::PathBuf::from(format!("{home}/charts")));
}

#[test]
fn given_settings_when_shown_as_toml_then_round_trips_into_raw_settings() {
    let settings = Settings::default();

    let shown = settings.to_toml().unwrap();
    let raw: RawSettings = toml::from_str(&shown).unwrap();

    assert!(shown.contains("[chart]"));
    assert_eq!(raw.chart.fill.as_deref(), Some("steelblue"));
    assert_eq!(raw.chart.width, Some(640.0));
}

#[test]
fn given_template_when_written_as_local_config_then_loads_defaults() {
    let project = project_with_config(&Settings::template());

    let settings = Settings::load(Some(project.path())).expect("load settings");

    assert_eq!(settings.chart.fill, "steelblue");
    assert!(settings.chart.validate().is_ok());
}
