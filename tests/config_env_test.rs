//! Environment layer of Settings::load.
//!
//! Runs as its own test binary: it rewrites process-wide environment
//! variables, so everything lives in a single test.

use std::fs;

use tempfile::TempDir;

use rsviz::config::{global_config_path, local_config_path, Settings};

#[test]
fn given_all_layers_when_load_then_env_beats_local_beats_global() {
    // Arrange: isolated XDG config home with a global config
    let xdg = TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", xdg.path());
    let global = global_config_path().expect("global config path");
    assert!(global.starts_with(xdg.path()));
    fs::create_dir_all(global.parent().unwrap()).unwrap();
    fs::write(
        &global,
        "[chart]\nwidth = 500\nheight = 300\nfill = \"gray\"\n",
    )
    .unwrap();

    let project = TempDir::new().unwrap();
    fs::write(
        local_config_path(project.path()),
        "[chart]\nheight = 350\nfill = \"navy\"\n",
    )
    .unwrap();

    // Act: global and local only
    let layered = Settings::load(Some(project.path())).unwrap();

    // Assert
    assert_eq!(layered.chart.width, 500.0, "global over defaults");
    assert_eq!(layered.chart.height, 350.0, "local over global");
    assert_eq!(layered.chart.fill, "navy");

    // Act: env on top
    std::env::set_var("RSVIZ_CHART__FILL", "crimson");
    std::env::set_var("RSVIZ_CHART__TICKS", "3");
    std::env::set_var("RSVIZ_CHART__TITLE", "Sales");
    let with_env = Settings::load(Some(project.path()));
    std::env::remove_var("RSVIZ_CHART__FILL");
    std::env::remove_var("RSVIZ_CHART__TICKS");
    std::env::remove_var("RSVIZ_CHART__TITLE");
    let with_env = with_env.unwrap();

    // Assert
    assert_eq!(with_env.chart.fill, "crimson", "env over local");
    assert_eq!(with_env.chart.ticks, 3);
    assert_eq!(with_env.chart.title.as_deref(), Some("Sales"));
    assert_eq!(with_env.chart.height, 350.0);
}
