//! Command dispatch: settings resolution and subcommand handlers

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{Format, IoResultExt};
use crate::cli::args::{Cli, Commands, ConfigCommands, InputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TracingObserver;
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;

    match &cli.command {
        Some(Commands::Convert {
            input,
            output: output_path,
            format,
            write,
        }) => {
            let settings = resolve_settings(&project_dir, input)?;
            cmd_convert(settings, input, output_path.as_deref(), *format, *write)
        }
        Some(Commands::Tree { input }) => {
            let settings = resolve_settings(&project_dir, input)?;
            cmd_tree(settings, input)
        }
        Some(Commands::Config { command }) => cmd_config(&project_dir, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        )),
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => {
            let cwd = std::env::current_dir()
                .with_path_context("resolve working directory", Path::new("."))?;
            Ok(cwd)
        }
    }
}

/// Layered settings with command line flags applied last.
fn resolve_settings(project_dir: &Path, input: &InputArgs) -> CliResult<Settings> {
    let mut settings = Settings::load(Some(project_dir))?;
    apply_input_overrides(&mut settings, input);
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

pub fn apply_input_overrides(settings: &mut Settings, input: &InputArgs) {
    if let Some(delimiter) = &input.delimiter {
        settings.delimiter = delimiter.clone();
    }
    if let Some(skip_header) = input.skip_header {
        settings.skip_header = skip_header;
    }
    if let Some(skip_columns) = input.skip_columns {
        settings.skip_columns = skip_columns;
    }
    if input.strict {
        settings.strict = true;
    }
}

/// Explicit flag, then output extension, then configured default.
pub fn resolve_format(
    explicit: Option<Format>,
    output_path: Option<&Path>,
    settings: &Settings,
) -> Format {
    explicit
        .or_else(|| output_path.and_then(Format::from_extension))
        .unwrap_or(settings.format)
}

#[instrument(skip(settings))]
fn cmd_convert(
    settings: Settings,
    input: &InputArgs,
    output_path: Option<&Path>,
    format: Option<Format>,
    write: bool,
) -> CliResult<()> {
    let format = resolve_format(format, output_path, &settings);
    let config = settings.converter_config(&input.file);
    let target = match (output_path, write) {
        (Some(path), _) => Some(path.to_path_buf()),
        (None, true) => Some(settings.derived_output_path(&input.file, format)),
        (None, false) => None,
    };

    let container = ServiceContainer::new(settings);
    let service = container.conversion_service();
    let rendered = service.run(&config, format, &TracingObserver)?;

    match target {
        Some(path) => {
            service.write(&rendered.text, &path)?;
            output::action(
                "Wrote",
                &format!(
                    "{} ({}, {} roots)",
                    path.display(),
                    rendered.format,
                    rendered.forest.len()
                ),
            );
        }
        None => output::data(&rendered.text),
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_tree(settings: Settings, input: &InputArgs) -> CliResult<()> {
    let config = settings.converter_config(&input.file);
    let container = ServiceContainer::new(settings);
    let rendered = container
        .conversion_service()
        .run(&config, Format::Tree, &TracingObserver)?;
    output::data(&rendered.text);
    Ok(())
}

fn cmd_config(project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(project_dir))?;
            output::data(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match global_config_path() {
                Some(path) => output::detail(&describe_path("global", &path)),
                None => output::detail("global: no config directory on this platform"),
            }
            output::detail(&describe_path("local", &local_config_path(project_dir)));
        }
        ConfigCommands::Template => output::data(&Settings::template()),
    }
    Ok(())
}

fn describe_path(label: &str, path: &Path) -> String {
    let state = if path.exists() { "found" } else { "not found" };
    format!("{}: {} ({})", label, path.display(), state)
}
