//! Command dispatch

use std::io::{self, Write};
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::DragSession;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::CliResult;
use crate::cli::output;
use crate::cli::session::run_session;
use crate::config::{self, Settings};
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            _completion(*shell);
            Ok(())
        }
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Tree) | None => _tree(&build_container(cli)?),
        Some(Commands::Move {
            dragged,
            target,
            export,
        }) => _move(&build_container(cli)?, dragged, target, *export),
        Some(Commands::Check {
            ancestor,
            descendant,
        }) => _check(&build_container(cli)?, ancestor, descendant),
        Some(Commands::Add { label, parent }) => {
            _add(&build_container(cli)?, label, parent.as_deref())
        }
        Some(Commands::Session) => _session(&build_container(cli)?),
    }
}

fn project_dir(cli: &Cli) -> Option<PathBuf> {
    cli.project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
}

/// Loads settings and applies the global flags on top.
fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let mut settings = Settings::load(project_dir(cli).as_deref())?;
    if let Some(seed) = &cli.seed {
        settings.seed_file = Some(seed.clone());
    }
    if cli.no_ids {
        settings.show_ids = false;
    }
    debug!(?settings, "effective settings");
    Ok(ServiceContainer::new(settings))
}

fn _completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(skip(container))]
fn _tree(container: &ServiceContainer) -> CliResult<()> {
    let service = container.tree_service();
    let tree = service.load_tree()?;
    print!("{}", service.render(&tree, None));
    output::detail(&service.summary(&tree));
    Ok(())
}

#[instrument(skip(container))]
fn _move(
    container: &ServiceContainer,
    dragged: &str,
    target: &str,
    export: bool,
) -> CliResult<()> {
    let service = container.tree_service();
    let mut tree = service.load_tree()?;
    let (outcome, body) = service.move_and_render(&mut tree, dragged, target, export)?;

    // stderr keeps exported TOML clean
    output::outcome(&outcome);
    print!("{body}");
    Ok(())
}

#[instrument(skip(container))]
fn _check(container: &ServiceContainer, ancestor: &str, descendant: &str) -> CliResult<()> {
    let tree = container.tree_service().load_tree()?;
    for id in [ancestor, descendant] {
        if !tree.contains(id) {
            output::warning(&format!("unknown id: {id}"));
        }
    }

    if tree.is_descendant(ancestor, descendant) {
        output::success(&format!("{descendant} is a descendant of {ancestor}"));
        let path: Vec<&str> = tree
            .ancestors(descendant)
            .into_iter()
            .map(|id| id.as_str())
            .collect();
        output::detail(&format!("ancestors: {}", itertools::join(path, " > ")));
    } else {
        output::failure(&format!("{descendant} is not a descendant of {ancestor}"));
    }
    Ok(())
}

#[instrument(skip(container))]
fn _add(container: &ServiceContainer, label: &str, parent: Option<&str>) -> CliResult<()> {
    let service = container.tree_service();
    let mut tree = service.load_tree()?;
    let id = service.add_item(&mut tree, label, parent)?;
    output::success(&format!("added {id}"));
    print!("{}", service.render(&tree, Some(&id)));
    Ok(())
}

#[instrument(skip(container))]
fn _session(container: &ServiceContainer) -> CliResult<()> {
    let service = container.tree_service();
    let mut session = DragSession::new(service.load_tree()?);
    output::header("nestdnd session (type 'help' for commands)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run_session(&mut session, &service, stdin.lock(), &mut stdout)?;
    stdout
        .flush()
        .map_err(|e| InfraError::io("flush stdout", e))?;
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(project_dir(cli).as_deref())?;
            output::info(settings.to_toml()?.trim_end());
        }
        ConfigCommands::Path => {
            output::header("Config files (lowest to highest precedence)");
            match config::global_config_path() {
                Some(path) => output::detail(&describe_path("global", &path)),
                None => output::detail(&"global: (no config directory)"),
            }
            if let Some(dir) = project_dir(cli) {
                output::detail(&describe_path("local", &config::local_config_path(&dir)));
            }
            output::detail(&format!("env:    {}_*", config::ENV_PREFIX));
        }
        ConfigCommands::Template => output::info(Settings::template().trim_end()),
    }
    Ok(())
}

fn describe_path(layer: &str, path: &std::path::Path) -> String {
    let state = if path.is_file() { "found" } else { "missing" };
    format!("{layer:<7} {} ({state})", path.display())
}
