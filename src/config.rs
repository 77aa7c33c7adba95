//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rsviz/rsviz.toml`
//! 3. Local config: `<project_dir>/.rsviz.toml`
//! 4. Environment variables: `RSVIZ_*` prefix, `__` between sections
//!    (e.g. `RSVIZ_CHART__WIDTH=800`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::MAX_TICKS;
use crate::util::path::expand_env_vars;

/// Chart rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    /// Total SVG width in pixels
    pub width: f64,
    /// Total SVG height in pixels
    pub height: f64,
    /// Space around the plot area, in pixels
    pub margin: f64,
    /// Inner band padding as a fraction of the band step, in `[0, 1)`
    pub padding: f64,
    /// Bar fill colour
    pub fill: String,
    /// Record field holding the category label
    pub label_key: String,
    /// Record field holding the bar value
    pub value_key: String,
    /// Approximate number of y axis ticks (0 disables the axis)
    pub ticks: usize,
    /// Optional chart title
    pub title: Option<String>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 400.0,
            margin: 30.0,
            padding: 0.1,
            fill: "steelblue".into(),
            label_key: "label".into(),
            value_key: "value".into(),
            ticks: 5,
            title: None,
        }
    }
}

impl ChartSettings {
    /// Checks that the plot area is non-empty and the padding is a fraction.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });
        if !(self.width > 2.0 * self.margin) || !(self.height > 2.0 * self.margin) {
            return invalid(format!(
                "chart {}x{} leaves no room inside a margin of {}",
                self.width, self.height, self.margin
            ));
        }
        if !(0.0..1.0).contains(&self.padding) {
            return invalid(format!("padding must be in [0, 1), got {}", self.padding));
        }
        if self.ticks > MAX_TICKS {
            return invalid(format!(
                "ticks must be at most {}, got {}",
                MAX_TICKS, self.ticks
            ));
        }
        if self.label_key.is_empty() || self.value_key.is_empty() {
            return invalid("label_key and value_key must not be empty".to_string());
        }
        Ok(())
    }
}

/// Raw chart config for intermediate parsing (`None` → not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawChartSettings {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub margin: Option<f64>,
    pub padding: Option<f64>,
    pub fill: Option<String>,
    pub label_key: Option<String>,
    pub value_key: Option<String>,
    pub ticks: Option<usize>,
    pub title: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub chart: RawChartSettings,
}

impl ChartSettings {
    /// Overlay wins wherever it specifies a value.
    pub fn merge(&self, overlay: &RawChartSettings) -> Self {
        Self {
            width: overlay.width.unwrap_or(self.width),
            height: overlay.height.unwrap_or(self.height),
            margin: overlay.margin.unwrap_or(self.margin),
            padding: overlay.padding.unwrap_or(self.padding),
            fill: overlay.fill.clone().unwrap_or_else(|| self.fill.clone()),
            label_key: overlay
                .label_key
                .clone()
                .unwrap_or_else(|| self.label_key.clone()),
            value_key: overlay
                .value_key
                .clone()
                .unwrap_or_else(|| self.value_key.clone()),
            ticks: overlay.ticks.unwrap_or(self.ticks),
            title: overlay.title.clone().or_else(|| self.title.clone()),
        }
    }
}

/// Unified configuration for rsviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Directory for rendered files given as bare names (default: `.`)
    pub output_dir: PathBuf,
    /// Chart rendering settings
    pub chart: ChartSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            chart: ChartSettings::default(),
        }
    }
}

/// Get the XDG config directory for rsviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rsviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rsviz.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".rsviz.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.output_dir.to_string_lossy().as_ref());
        self.output_dir = PathBuf::from(expanded);
    }

    /// Merge overlay config onto self (base): overlay wins if specified.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            output_dir: overlay
                .output_dir
                .clone()
                .unwrap_or_else(|| self.output_dir.clone()),
            chart: self.chart.merge(&overlay.chart),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/rsviz/rsviz.toml`
    /// 3. Local config: `<project_dir>/.rsviz.toml`
    /// 4. Environment variables: `RSVIZ_*` prefix
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                debug!("load: local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply RSVIZ_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("RSVIZ")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("output_dir") {
            settings.output_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_float("chart.width") {
            settings.chart.width = val;
        }
        if let Ok(val) = config.get_float("chart.height") {
            settings.chart.height = val;
        }
        if let Ok(val) = config.get_float("chart.margin") {
            settings.chart.margin = val;
        }
        if let Ok(val) = config.get_float("chart.padding") {
            settings.chart.padding = val;
        }
        if let Ok(val) = config.get_string("chart.fill") {
            settings.chart.fill = val;
        }
        if let Ok(val) = config.get_string("chart.label_key") {
            settings.chart.label_key = val;
        }
        if let Ok(val) = config.get_string("chart.value_key") {
            settings.chart.value_key = val;
        }
        if let Ok(val) = config.get::<usize>("chart.ticks") {
            settings.chart.ticks = val;
        }
        if let Ok(val) = config.get_string("chart.title") {
            settings.chart.title = Some(val);
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rsviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rsviz/rsviz.toml
#   Local:  <project_dir>/.rsviz.toml
#   Env:    RSVIZ_* environment variables, e.g. RSVIZ_CHART__WIDTH=800

# Directory for rendered files given as bare names
# output_dir = "."

[chart]
# width = 640
# height = 400
# margin = 30
# Inner band padding, fraction of the band step in [0, 1)
# padding = 0.1
# fill = "steelblue"
# Record fields holding the category label and the bar value
# label_key = "label"
# value_key = "value"
# Approximate number of y axis ticks, 0 disables the axis
# ticks = 5
# title = "Monthly sales"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
