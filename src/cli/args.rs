//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Hierarchical checkbox tree: tri-state selection, lazy rendering and filtering
#[derive(Parser, Debug)]
#[command(name = "stv")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Selection-related options shared by tree commands.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct SelectionArgs {
    /// Values to select (comma separated or repeated)
    #[arg(short, long, value_delimiter = ',')]
    pub select: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the tree and print it with selection markers
    Show {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Generations below the root's children to render
        #[arg(long)]
        depth: Option<usize>,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Filter term; matches are revealed and marked
        #[arg(short, long)]
        filter: Option<String>,
        /// Values of branches to expand after rendering
        #[arg(short, long)]
        expand: Vec<String>,
        /// Print the rendered element tree instead of the node tree
        #[arg(long)]
        elements: bool,
    },

    /// Apply a selection and print the resulting selection
    Selection {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Values to deselect afterwards (comma separated or repeated)
        #[arg(long, value_delimiter = ',')]
        deselect: Vec<String>,
    },

    /// Print nodes whose label or value contains TERM
    Find {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Case-insensitive search term
        term: String,
        /// Select all matches and print the resulting selection
        #[arg(long)]
        select: bool,
    },

    /// Print the node at a child-index path (no indices: root)
    Locate {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Child indices from the root
        indices: Vec<usize>,
    },

    /// Print the tree as HTML markup
    Markup {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Generations below the root's children to render
        #[arg(long)]
        depth: Option<usize>,
    },

    /// Write a snapshot of the tree with selection state as JSON
    Copy {
        /// Tree data (JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(flatten)]
        selection: SelectionArgs,
        /// Output file (default: stdout)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn given_cli_definition_when_debug_asserted_then_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_comma_separated_selection_when_parsing_then_split() {
        let cli = Cli::parse_from(["stv", "-dd", "selection", "tree.json", "-s", "a,b", "-s", "c"]);
        assert_eq!(cli.debug, 2);
        match cli.command {
            Some(Commands::Selection { selection, .. }) => {
                assert_eq!(selection.select, ["a", "b", "c"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
