use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    BehavioursArgs, ConnectArgs, ExportCommands, GraphArgs, ImportCommands, PathArgs,
};

/// Terminal editor for hierarchical behaviour plans
///
/// plantree keeps a plan tree and the schema of behaviour and predicate
/// names it refers to. Documents are validated on import and stored in the
/// data directory; the bundled defaults are used until the first import.
#[derive(Parser)]
#[command(version, about, name = "plantree")]
pub struct Args {
    /// Directory holding plan_tree.json and schema.json. Defaults to
    /// $XDG_DATA_HOME/plantree
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
///
/// Paths name plans by label from the root, e.g. `execute/retry`; `/`
/// addresses the root.
#[derive(Subcommand)]
pub enum Commands {
    /// Display the plan tree (default)
    #[command(alias = "t")]
    Tree,
    /// Show details of one plan
    #[command(alias = "s")]
    Show(PathArgs),
    /// Import a plan tree, schema or single plan
    #[command(alias = "i")]
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Export a plan tree, schema or single plan as JSON
    #[command(alias = "e")]
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Remove a plan and its subtree
    #[command(alias = "rm")]
    Remove(PathArgs),
    /// Show the graph of a plan's children and transitions
    #[command(alias = "g")]
    Graph(GraphArgs),
    /// Add a transition between two children of a plan
    Connect(ConnectArgs),
    /// List the behaviours offered by the schema
    #[command(alias = "b")]
    Behaviours(BehavioursArgs),
    /// Report unknown behaviours, predicates and duplicate names
    Check,
}
