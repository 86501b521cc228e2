//! Core library for the plantree behaviour-plan editor.
//!
//! A behaviour plan is a tree of [`PlanNode`]s. Each node names the
//! behaviours it runs, the transitions between its children and the child
//! plans themselves. A [`Schema`] lists the behaviour and predicate names
//! the runtime understands.
//!
//! The [`PlanTreeStore`] owns the current tree and schema. Every change
//! is validated, persisted and only then published to the views in
//! [`projection`], which rebuild themselves from the new snapshot.
//!
//! # Display Architecture
//!
//! - **Domain Models** ([`models`]): plain serde data
//! - **Display** ([`display`]): markdown formatting for models, views and
//!   operation results
//! - **Terminal Rendering**: done by the CLI
//!
//! # Quick Start
//!
//! ```rust
//! use plantree_core::{BehaviourSelector, StoreBuilder, TreeView};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = tempfile::tempdir()?;
//! let mut store = StoreBuilder::new().with_data_dir(Some(dir.path())).build()?;
//!
//! let mut tree = TreeView::new(&store);
//! let mut behaviours = BehaviourSelector::attached(&store);
//!
//! store.import_schema(r#"{
//!     "BehaviourEnum": {"ENUM": {"0": ["Idle"]}},
//!     "PredicateEnum": {"ENUM": {}}
//! }"#)?;
//! store.import_plan_tree(r#"{
//!     "name": "root",
//!     "behaviour": {"Idle": null},
//!     "transitions": [],
//!     "plans": []
//! }"#)?;
//!
//! tree.sync();
//! behaviours.sync();
//! assert_eq!(tree.tree().root.label, "root");
//! assert_eq!(behaviours.options()[0].label, "Idle");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod display;
pub mod error;
pub mod models;
pub mod params;
pub mod projection;
pub mod settings;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use display::{BehaviourOptions, Findings, ImportResult, OperationStatus, RemoveResult};
pub use error::{EditorError, Result};
pub use models::{Fingerprint, PlanNode, Schema, Transition};
pub use params::PlanPath;
pub use projection::{BehaviourSelector, GraphView, TabManager, TreeView};
pub use store::{PlanTreeStore, StoreBuilder, StoreEvent, Subscription};
pub use validation::{lint, validate_plan, validate_schema};
