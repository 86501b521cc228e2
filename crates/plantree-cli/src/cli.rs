//! Command argument wrappers and their handlers.
//!
//! Argument structs carry the clap derives and convert into core parameter
//! types, so `plantree-core` stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → PlanTreeStore → Markdown
//! ```

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Subcommand};
use log::{debug, warn};
use plantree_core::{
    display::{BehaviourOptions, Findings, ImportResult, OperationStatus, RemoveResult},
    lint,
    params::PlanPath,
    projection::{self, TabManager, INPUT_PORT, OUTPUT_PORT},
    BehaviourSelector, PlanTreeStore,
};
use serde_json::{Map, Value};

use crate::renderer::TerminalRenderer;

/// Read from standard input instead of a file.
const STDIN_MARKER: &str = "-";

/// A plan addressed by its label path
#[derive(Args)]
pub struct PathArgs {
    #[arg(
        default_value = "/",
        help = "Label path of the plan, e.g. execute/retry; / is the root"
    )]
    pub path: String,
}

impl From<PathArgs> for PlanPath {
    fn from(val: PathArgs) -> Self {
        PlanPath::from(val.path.as_str())
    }
}

/// Source of an imported document
#[derive(Args)]
pub struct ImportArgs {
    #[arg(help = "JSON file to import, or - to read standard input")]
    pub file: PathBuf,
}

/// Import a single plan below an existing one
///
/// A child with the same name is replaced in place, otherwise the plan is
/// appended to the parent's children.
#[derive(Args)]
pub struct ImportPlanArgs {
    #[arg(help = "JSON file with one plan, or - to read standard input")]
    pub file: PathBuf,
    #[arg(long, default_value = "/", help = "Label path of the parent plan")]
    pub parent: String,
}

#[derive(Subcommand)]
pub enum ImportCommands {
    /// Replace the whole plan tree
    Tree(ImportArgs),
    /// Replace the schema
    Schema(ImportArgs),
    /// Insert one plan under a parent
    Plan(ImportPlanArgs),
}

/// Destination of an exported document
#[derive(Args)]
pub struct ExportArgs {
    #[arg(short, long, help = "Write to this file instead of standard output")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ExportPlanArgs {
    #[arg(help = "Label path of the plan to export")]
    pub path: String,
    #[arg(short, long, help = "Write to this file instead of standard output")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Export the whole plan tree
    Tree(ExportArgs),
    /// Export the schema
    Schema(ExportArgs),
    /// Export one plan and its subtree
    Plan(ExportPlanArgs),
}

#[derive(Args)]
pub struct GraphArgs {
    #[arg(default_value = "/", help = "Label path of the plan to open")]
    pub path: String,
}

/// Connect two children of a plan
///
/// The connection is made in the plan's graph view and written back as a
/// transition with a single source and destination.
#[derive(Args)]
pub struct ConnectArgs {
    #[arg(default_value = "/", help = "Label path of the plan owning the children")]
    pub path: String,
    #[arg(long, help = "Name of the source child plan")]
    pub from: String,
    #[arg(long, help = "Name of the destination child plan")]
    pub to: String,
    #[arg(long, help = "Predicate name from the schema's PredicateEnum")]
    pub predicate: String,
}

#[derive(Args)]
pub struct BehavioursArgs {
    #[arg(long, help = "Mark the option for this behaviour name as selected")]
    pub select: Option<String>,
}

/// Command handlers sharing one store and renderer
pub struct Cli {
    store: PlanTreeStore,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(store: PlanTreeStore, renderer: TerminalRenderer) -> Self {
        Self { store, renderer }
    }

    pub fn show_tree(&self) -> Result<()> {
        let tree = projection::project(&self.store.get_plan_tree());
        self.renderer.render(&tree.to_string())
    }

    pub fn show_plan(&self, path: PlanPath) -> Result<()> {
        let root = self.store.get_plan_tree();
        let plan = projection::resolve(&root, path.labels())
            .ok_or_else(|| anyhow!("Plan '{path}' not found"))?;
        self.renderer.render(&plan.to_string())
    }

    pub fn handle_import_command(&mut self, command: ImportCommands) -> Result<()> {
        match command {
            ImportCommands::Tree(args) => {
                let text = read_document(&args.file)?;
                self.store
                    .import_plan_tree(&text)
                    .context("Failed to import plan tree")?;
                self.warn_findings();
                let result = ImportResult::new(self.store.get_plan_tree().as_ref().clone());
                self.renderer.render(&result.to_string())
            }
            ImportCommands::Schema(args) => {
                let text = read_document(&args.file)?;
                self.store
                    .import_schema(&text)
                    .context("Failed to import schema")?;
                self.warn_findings();
                let schema = self.store.get_schema().as_ref().clone();
                let fingerprint = self.store.schema_fingerprint().clone();
                let result = ImportResult::new((schema, fingerprint));
                self.renderer.render(&result.to_string())
            }
            ImportCommands::Plan(args) => {
                let text = read_document(&args.file)?;
                let parent = PlanPath::from(args.parent.as_str());
                let plan = self
                    .store
                    .import_plan(parent.labels(), &text)
                    .with_context(|| format!("Failed to import plan under {parent}"))?;
                self.warn_findings();
                let result = ImportResult::under(plan, parent);
                self.renderer.render(&result.to_string())
            }
        }
    }

    pub fn handle_export_command(&self, command: ExportCommands) -> Result<()> {
        let (document, output, what) = match command {
            ExportCommands::Tree(args) => (self.store.export_plan_tree()?, args.output, "plan tree"),
            ExportCommands::Schema(args) => (self.store.export_schema()?, args.output, "schema"),
            ExportCommands::Plan(args) => {
                let path = PlanPath::from(args.path.as_str());
                let document = self
                    .store
                    .export_plan(path.labels())
                    .with_context(|| format!("Failed to export plan {path}"))?;
                (document, args.output, "plan")
            }
        };

        match output {
            Some(file) => {
                fs::write(&file, format!("{document}\n"))
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                let status = OperationStatus::success(format!(
                    "Exported {what} to {}",
                    file.display()
                ));
                self.renderer.render(&status.to_string())
            }
            // Raw JSON so the output can be piped back into import.
            None => {
                println!("{document}");
                Ok(())
            }
        }
    }

    pub fn remove_plan(&mut self, path: PlanPath) -> Result<()> {
        let removed = self
            .store
            .remove_plan(path.labels())
            .with_context(|| format!("Failed to remove plan {path}"))?;
        self.renderer
            .render(&RemoveResult::new(removed, path).to_string())
    }

    pub fn show_graph(&self, path: PlanPath) -> Result<()> {
        let root = self.store.get_plan_tree();
        let mut tabs = TabManager::new();
        tabs.open_path(&root, path.labels())?;

        let mut output = String::new();
        if let Some(details) = tabs.details() {
            output.push_str(&details.to_string());
            output.push('\n');
        }
        if let Some(view) = tabs.active_view() {
            output.push_str(&view.to_string());
        }
        self.renderer.render(&output)
    }

    pub fn connect(&mut self, args: ConnectArgs) -> Result<()> {
        let path = PlanPath::from(args.path.as_str());
        let root = self.store.get_plan_tree();
        let mut tabs = TabManager::attached(&self.store);
        tabs.open_path(&root, path.labels())?;

        let view = tabs
            .active_view_mut()
            .ok_or_else(|| anyhow!("No graph open for {path}"))?;
        let from = view
            .node_by_label(&args.from)
            .ok_or_else(|| anyhow!("Plan {path} has no child '{}'", args.from))?
            .id;
        let to = view
            .node_by_label(&args.to)
            .ok_or_else(|| anyhow!("Plan {path} has no child '{}'", args.to))?
            .id;
        let edge = view.connect(from, OUTPUT_PORT, to, INPUT_PORT);
        let mut predicate = Map::new();
        predicate.insert(args.predicate.clone(), Value::Null);
        view.set_edge_predicate(edge, Value::Object(predicate));

        let plan = view
            .to_plan()
            .ok_or_else(|| anyhow!("Plan '{path}' not found"))?;
        self.store
            .replace_plan_at(path.labels(), plan)
            .with_context(|| format!("Failed to save transitions of {path}"))?;
        self.warn_findings();

        tabs.sync();
        let view = tabs
            .active_view()
            .ok_or_else(|| anyhow!("Plan '{path}' not found"))?;
        self.renderer.render(&view.to_string())
    }

    pub fn list_behaviours(&self, args: BehavioursArgs) -> Result<()> {
        let mut selector = BehaviourSelector::attached(&self.store);
        if let Some(name) = args.select {
            if selector.select_by_name(&name).is_none() {
                bail!("Behaviour '{name}' is not in the schema");
            }
        }
        self.renderer
            .render(&BehaviourOptions(&selector).to_string())
    }

    pub fn check(&self) -> Result<()> {
        let findings = Findings(lint(&self.store.get_plan_tree(), &self.store.get_schema()));
        self.renderer.render(&findings.to_string())?;
        if !findings.is_empty() {
            bail!("{} problems found", findings.len());
        }
        Ok(())
    }

    fn warn_findings(&self) {
        for finding in lint(&self.store.get_plan_tree(), &self.store.get_schema()) {
            warn!("{finding}");
        }
    }
}

/// Reads a document from `path`, or from standard input for `-`.
fn read_document(path: &Path) -> Result<String> {
    if path.as_os_str() == STDIN_MARKER {
        debug!("Reading document from standard input");
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read standard input")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
