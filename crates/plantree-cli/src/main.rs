//! plantree CLI application
//!
//! Command-line front end for viewing and editing behaviour plan trees.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use plantree_core::StoreBuilder;
use renderer::TerminalRenderer;
use Commands::*;

fn main() -> Result<()> {
    env_logger::init();

    let Args {
        data_dir,
        no_color,
        command,
    } = Args::parse();

    let store = StoreBuilder::new()
        .with_data_dir(data_dir)
        .build()
        .context("Failed to load plan tree and schema")?;

    let renderer = TerminalRenderer::new(!no_color);
    let mut cli = Cli::new(store, renderer);

    info!("plantree started");

    match command {
        Some(Tree) | None => cli.show_tree(),
        Some(Show(args)) => cli.show_plan(args.into()),
        Some(Import { command }) => cli.handle_import_command(command),
        Some(Export { command }) => cli.handle_export_command(command),
        Some(Remove(args)) => cli.remove_plan(args.into()),
        Some(Graph(args)) => cli.show_graph(args.path.as_str().into()),
        Some(Connect(args)) => cli.connect(args),
        Some(Behaviours(args)) => cli.list_behaviours(args),
        Some(Check) => cli.check(),
    }
}
