//! Display formatting for models, projections and operation results.
//!
//! Domain models and projections implement [`std::fmt::Display`] directly
//! (see [`models`]); collections and operation outcomes get wrapper types.
//! All output is markdown, rendered by the CLI's terminal renderer.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ Models & Views  │    │ Wrapper Types   │    │   Markdown      │
//! │ (PlanNode, ...) │───▶│ (ImportResult,  │───▶│    Output       │
//! │                 │    │  Findings, ...) │    │  (Terminal)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrappers (Findings, BehaviourOptions)
//! - [`results`]: Operation results (ImportResult, RemoveResult)
//! - [`status`]: Confirmation messages (OperationStatus)
//! - [`models`]: Display implementations for models and projections
//!
//! ## Usage Examples
//!
//! ```rust
//! use plantree_core::{display::OperationStatus, models::PlanNode, projection};
//!
//! let root = PlanNode::new("root").with_plan(PlanNode::new("child"));
//! let tree = projection::project(&root);
//! assert_eq!(
//!     tree.to_string(),
//!     "- root *(inactive)*\n  - child *(inactive)*\n"
//! );
//!
//! let status = OperationStatus::success("Wrote plan_tree.json");
//! assert_eq!(status.to_string(), "Success: Wrote plan_tree.json\n");
//! ```

pub mod collections;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{BehaviourOptions, Findings};
pub use results::{ImportResult, RemoveResult};
pub use status::OperationStatus;
