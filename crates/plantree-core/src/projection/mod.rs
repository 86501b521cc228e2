//! Read-side views derived from the store's snapshots.
//!
//! - [`tree`]: the label hierarchy shown in the tree panel, and the mapping
//!   from a selected label path back to its plan.
//! - [`graph`]: per-plan graph tabs with their canvas edits.
//! - [`selector`]: the behaviour choice list driven by the schema.
//!
//! Views are pull-based: each holds a [`crate::Subscription`] and applies
//! pending changes when its owner calls `sync`. Every projection is rebuilt
//! from a complete snapshot, so an observer never sees a half-applied tree.

pub mod graph;
pub mod selector;
pub mod tree;

pub use graph::{
    GraphEdge, GraphNode, GraphView, NodeId, NodeKind, PlanDetails, Position, TabManager,
    INPUT_PORT, OUTPUT_PORT,
};
pub use selector::{BehaviourSelector, SelectorOption};
pub use tree::{project, resolve, DisplayNode, DisplayTree, TreeView};
