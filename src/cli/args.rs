//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::config::ChartSettings;

/// Data-driven SVG charts: bind rows to a scene tree, scale them, render markup
#[derive(Parser, Debug)]
#[command(name = "rsviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding the local .rsviz.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a bar chart as SVG
    Bar {
        #[command(flatten)]
        chart: ChartArgs,

        /// Output file (default: stdout); bare names land in output_dir
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the generated scene tree as an outline
    Tree {
        #[command(flatten)]
        chart: ChartArgs,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Data source plus per-run overrides of the chart settings.
#[derive(Args, Debug, Clone, Default)]
pub struct ChartArgs {
    /// Data file (.json or .toml)
    #[arg(value_hint = ValueHint::FilePath)]
    pub data: PathBuf,

    /// SVG width in pixels
    #[arg(long)]
    pub width: Option<f64>,

    /// SVG height in pixels
    #[arg(long)]
    pub height: Option<f64>,

    /// Inner band padding in [0, 1)
    #[arg(long)]
    pub padding: Option<f64>,

    /// Record field holding the category label
    #[arg(long)]
    pub label_key: Option<String>,

    /// Record field holding the bar value
    #[arg(long)]
    pub value_key: Option<String>,

    /// Bar fill colour
    #[arg(long)]
    pub fill: Option<String>,

    /// Chart title
    #[arg(long)]
    pub title: Option<String>,

    /// Approximate number of y axis ticks (0 disables the axis)
    #[arg(long)]
    pub ticks: Option<usize>,
}

impl ChartArgs {
    /// Settings for this run: flags override the loaded settings.
    pub fn apply(&self, base: &ChartSettings) -> ChartSettings {
        ChartSettings {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            margin: base.margin,
            padding: self.padding.unwrap_or(base.padding),
            fill: self.fill.clone().unwrap_or_else(|| base.fill.clone()),
            label_key: self
                .label_key
                .clone()
                .unwrap_or_else(|| base.label_key.clone()),
            value_key: self
                .value_key
                .clone()
                .unwrap_or_else(|| base.value_key.clone()),
            ticks: self.ticks.unwrap_or(base.ticks),
            title: self.title.clone().or_else(|| base.title.clone()),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
