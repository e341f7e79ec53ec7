//! Command dispatch: each subcommand builds a view, drives it and prints.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{HtmlTemplate, RenderDepth, TreeView};
use crate::cli::args::{Cli, Commands, ConfigCommands, SelectionArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::error::format_path;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::loader;
use crate::infrastructure::traits::UiSurface;
use crate::infrastructure::{InfraError, MemoryDom};

pub fn execute(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `stv --help`".to_string(),
        ));
    };

    // Completion and config template need no settings.
    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config {
            command: ConfigCommands::Template,
        } => {
            output::info(&Settings::template());
            return Ok(());
        }
        _ => {}
    }

    let settings = Settings::load(cli.config.as_deref()).map_err(InfraError::from)?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Show {
            file,
            depth,
            selection,
            filter,
            expand,
            elements,
        } => show(
            &container,
            file,
            *depth,
            selection,
            filter.as_deref(),
            expand,
            *elements,
        ),
        Commands::Selection {
            file,
            selection,
            deselect,
        } => selection_cmd(&container, file, selection, deselect),
        Commands::Find { file, term, select } => find(&container, file, term, *select),
        Commands::Locate { file, indices } => locate(&container, file, indices),
        Commands::Markup { file, depth } => markup(&container, file, *depth),
        Commands::Copy {
            file,
            selection,
            output,
        } => copy(&container, file, selection, output.as_deref()),
        Commands::Config { command } => config(&container, cli, command),
        Commands::Completion { .. } => Ok(()),
    }
}

/// Load `file` into a fresh view with `selection` applied.
fn load_view(
    container: &ServiceContainer,
    file: &Path,
    selection: &SelectionArgs,
) -> CliResult<TreeView<MemoryDom>> {
    let raw = loader::load_tree(file)?;
    let mut view = container.new_view()?;
    view.set_data(&raw)?;
    if !selection.select.is_empty() {
        warn_unknown(&view, &selection.select)?;
        view.set_selection(selection.select.clone())?;
    }
    Ok(view)
}

fn warn_unknown(view: &TreeView<MemoryDom>, values: &[String]) -> CliResult<()> {
    for value in values {
        if view.node_with_value(value)?.is_none() {
            output::warning(&format!("no node with value '{value}'"));
        }
    }
    Ok(())
}

fn render_depth(container: &ServiceContainer, depth: Option<usize>) -> RenderDepth {
    depth.map_or_else(|| container.settings.render_depth(), RenderDepth::Levels)
}

#[instrument(level = "debug", skip(container))]
fn show(
    container: &ServiceContainer,
    file: &Path,
    depth: Option<usize>,
    selection: &SelectionArgs,
    filter: Option<&str>,
    expand: &[String],
    elements: bool,
) -> CliResult<()> {
    let mut view = load_view(container, file, selection)?;
    let root_element = view.render(render_depth(container, depth))?;

    for value in expand {
        match view.node_with_value(value)?.map(|n| n.id) {
            Some(id) => view.expand(id)?,
            None => output::warning(&format!("no node with value '{value}'")),
        }
    }
    if let Some(term) = filter {
        let matches = view.apply_filter(term)?;
        debug!(matches, "filter applied");
    }

    if elements {
        let container_el = view.container().unwrap_or(root_element);
        output::info(&view.surface().to_tree(container_el));
    } else if let Some(tree) = output::visible_tree(&view) {
        output::info(&tree);
    }
    if let Some(count_el) = view.match_count_element() {
        if !view.filter_term().is_empty() {
            if let Some(text) = view.surface().text(count_el) {
                output::detail(&text);
            }
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn selection_cmd(
    container: &ServiceContainer,
    file: &Path,
    selection: &SelectionArgs,
    deselect: &[String],
) -> CliResult<()> {
    let mut view = load_view(container, file, selection)?;
    for value in deselect {
        match view.node_with_value(value)?.map(|n| n.id) {
            Some(id) => view.deselect(id)?,
            None => output::warning(&format!("no node with value '{value}'")),
        }
    }
    for value in view.get_selection() {
        output::info(&value);
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn find(container: &ServiceContainer, file: &Path, term: &str, select: bool) -> CliResult<()> {
    let mut view = load_view(container, file, &SelectionArgs::default())?;
    let count = view.apply_filter(term)?;

    output::header(&crate::application::render::match_count_text(term, count));
    for node in view.get_matching() {
        let path = view.path_of(node.id)?;
        output::detail(&format!("{:<12} {}", format_path(&path), output::node_line(node)));
    }

    if select {
        view.select_matching();
        output::header(&"Selection");
        for value in view.get_selection() {
            output::detail(&value);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn locate(container: &ServiceContainer, file: &Path, indices: &[usize]) -> CliResult<()> {
    let view = load_view(container, file, &SelectionArgs::default())?;
    let node = view.node_at(indices)?;
    output::info(&output::node_line(node));
    output::detail(&format!("id: {}", node.id));
    output::detail(&format!("value: {}", node.value));
    output::detail(&format!("children: {}", node.children.len()));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn markup(container: &ServiceContainer, file: &Path, depth: Option<usize>) -> CliResult<()> {
    let view = load_view(container, file, &SelectionArgs::default())?;
    let html = view.render_to_string(render_depth(container, depth), &HtmlTemplate)?;
    output::info(&html);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn copy(
    container: &ServiceContainer,
    file: &Path,
    selection: &SelectionArgs,
    output_path: Option<&Path>,
) -> CliResult<()> {
    let view = load_view(container, file, selection)?;
    let snapshot = view.copy_data()?;
    match output_path {
        Some(path) => loader::write_snapshot(path, &snapshot)?,
        None => {
            let json = serde_json::to_string_pretty(&snapshot)
                .map_err(|e| InfraError::parse("serialize snapshot", e))?;
            output::info(&json);
        }
    }
    Ok(())
}

fn config(container: &ServiceContainer, cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => {
                    let status = if path.exists() { "" } else { " (not found)" };
                    output::info(&format!("global: {}{}", path.display(), status));
                }
                None => output::info(&"global: (no config directory)"),
            }
            if let Some(local) = &cli.config {
                output::info(&format!("local: {}", local.display()));
            }
        }
    }
    Ok(())
}
