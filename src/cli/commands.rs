//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::BarChart;
use crate::cli::args::{ChartArgs, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, ServiceContainer};
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::resolve_output;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    match &cli.command {
        Some(Commands::Bar { chart, output }) => {
            let container = container(&project_dir)?;
            cmd_bar(&container, chart, output.as_deref())
        }
        Some(Commands::Tree { chart }) => {
            let container = container(&project_dir)?;
            cmd_tree(&container, chart)
        }
        Some(Commands::Config { command }) => {
            let container = container(&project_dir)?;
            cmd_config(&container, command, &project_dir)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see 'rsviz --help'".to_string(),
        )),
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) if !dir.is_dir() => Err(CliError::InvalidArgs(format!(
            "not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("get current directory", e))),
    }
}

fn container(project_dir: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(project_dir))?;
    Ok(ServiceContainer::new(settings))
}

fn render(container: &ServiceContainer, args: &ChartArgs) -> CliResult<BarChart> {
    let settings = args.apply(&container.settings.chart);
    debug!("render: {:?}", settings);
    Ok(container
        .chart_service
        .bar_chart_from_file(&args.data, &settings)?)
}

#[instrument(skip(container))]
fn cmd_bar(container: &ServiceContainer, args: &ChartArgs, out: Option<&Path>) -> CliResult<()> {
    let chart = render(container, args)?;
    match out {
        Some(path) => {
            let path = resolve_output(&container.settings.output_dir, path);
            let written = container.chart_service.write_svg(&chart, &path)?;
            output::success(&format!(
                "{} bars written to {}",
                chart.bars,
                written.display()
            ));
        }
        None => output::info(&chart.to_markup()),
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, args: &ChartArgs) -> CliResult<()> {
    let chart = render(container, args)?;
    output::info(&chart.document.to_tree_string());
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: &Path,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config paths");
            match global_config_path() {
                Some(path) => output::detail(&format!(
                    "global: {} {}",
                    path.display(),
                    exists_marker(container.fs.as_ref(), &path)
                )),
                None => output::warning("no home directory, global config disabled"),
            }
            let local = local_config_path(project_dir);
            output::detail(&format!(
                "local:  {} {}",
                local.display(),
                exists_marker(container.fs.as_ref(), &local)
            ));
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(project_dir)
            };
            init_config(container.fs.as_ref(), &path)?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}

/// Writes the settings template to `path`; refuses to overwrite.
#[instrument(skip(fs))]
pub fn init_config(fs: &dyn FileSystem, path: &Path) -> CliResult<()> {
    if fs.exists(path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

fn exists_marker(fs: &dyn FileSystem, path: &Path) -> &'static str {
    if fs.exists(path) {
        "(exists)"
    } else {
        "(not found)"
    }
}
