//! Command dispatch

use std::io::{self, Read};
use std::path::Path;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputFormat, RenderArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::{strip_code_fence, RoadmapNode, SchemaError};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Generate { prompt, render }) => _generate(cli, prompt, render),
        Some(Commands::Parse { file, render }) => _parse(cli, file.as_deref(), render),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "roadmapgen", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, try `roadmapgen --help`".to_string(),
        )),
    }
}

/// Layered settings with command-line flags on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?.merge_with(&cli.settings_overrides());
    settings.validate()?;
    debug!(?settings, "effective settings");
    Ok(settings)
}

#[instrument(skip(cli, render))]
fn _generate(cli: &Cli, prompt: &[String], render: &RenderArgs) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli)?)?;
    let service = container.roadmap_service();

    let prompt = if prompt.is_empty() {
        read_stdin()?.trim_end().to_string()
    } else {
        prompt.join(" ")
    };

    let answer = service.generate_json(&prompt)?;
    let document = if render.unfence {
        strip_code_fence(&answer)
    } else {
        answer.as_str()
    };

    let tree = if render.format != OutputFormat::Raw || render.stats {
        Some(service.parse_tree(document)?)
    } else {
        None
    };

    emit(container.fs.as_ref(), tree.as_ref(), document, render)
}

#[instrument(skip(cli, render))]
fn _parse(cli: &Cli, file: Option<&Path>, render: &RenderArgs) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli)?)?;
    let service = container.roadmap_service();

    let input = match file {
        Some(path) if path != Path::new("-") => container
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?,
        _ => read_stdin()?,
    };
    let document = if render.unfence {
        strip_code_fence(&input)
    } else {
        input.as_str()
    };

    let tree = service.parse_tree(document)?;
    emit(container.fs.as_ref(), Some(&tree), document, render)
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not found" };
                output::action("global", &format!("{} ({})", path.display(), state));
            }
            None => output::warning("cannot determine config directory"),
        },
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".to_string())
            })?;
            write_template(&RealFileSystem, &path, *force)?;
            output::success(&format!("created {}", path.display()));
        }
    }
    Ok(())
}

/// Write the config template, refusing to clobber an existing file unless forced.
pub fn write_template(fs: &dyn FileSystem, path: &Path, force: bool) -> CliResult<()> {
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    fs.ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    fs.write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

/// Render a roadmap in the requested format.
///
/// `Raw` returns `document` unchanged; the other formats need the parsed tree.
pub fn render_roadmap(
    tree: Option<&RoadmapNode>,
    document: &str,
    format: OutputFormat,
) -> CliResult<String> {
    match (format, tree) {
        (OutputFormat::Raw, _) => Ok(document.to_string()),
        (OutputFormat::Tree, Some(tree)) => Ok(tree.to_tree().to_string()),
        (OutputFormat::Json, Some(tree)) => {
            let json = serde_json::to_string_pretty(tree)
                .map_err(|e| ApplicationError::from(SchemaError::from(e)))?;
            Ok(json)
        }
        (_, None) => Err(CliError::Usage(format!(
            "{format:?} output requires a parsed roadmap"
        ))),
    }
}

fn emit(
    fs: &dyn FileSystem,
    tree: Option<&RoadmapNode>,
    document: &str,
    render: &RenderArgs,
) -> CliResult<()> {
    let rendered = render_roadmap(tree, document, render.format)?;

    match &render.output {
        Some(path) => {
            fs.ensure_parent(path).map_err(|e| {
                InfraError::io(format!("create directory for {}", path.display()), e)
            })?;
            fs.write(path, &rendered)
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("wrote {}", path.display()));
        }
        None => output::info(rendered.trim_end()),
    }

    if render.stats {
        if let Some(tree) = tree {
            output::stat("nodes", &tree.node_count());
            output::stat("depth", &tree.depth());
            output::stat("leaves", &tree.leaves().len());
        }
    }
    Ok(())
}

fn read_stdin() -> CliResult<String> {
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| InfraError::io("read stdin", e))?;
    Ok(buf)
}
