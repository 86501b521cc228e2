//! Data models for plan trees and schemas.
//!
//! The editor works on two documents:
//!
//! - [`PlanNode`]: a recursive tree of plans. Each node owns its children, so
//!   a whole tree is a single value that can be swapped atomically.
//! - [`Schema`]: the behaviour and predicate enumerations that plan nodes
//!   refer to by name.
//!
//! Both types round-trip through `serde_json` with the document layout the
//! plan runtime writes. Display implementations live in
//! [`crate::display::models`].
//!
//! # Examples
//!
//! ```rust
//! use plantree_core::models::PlanNode;
//!
//! let root = PlanNode::new("root")
//!     .with_behaviour("SequenceBehaviour")
//!     .with_plan(PlanNode::new("patrol").with_behaviour("Patrol"));
//!
//! assert_eq!(root.count(), 2);
//! assert_eq!(root.descendant(&["patrol"]).map(|p| p.name.as_str()), Some("patrol"));
//! ```

pub mod plan;
pub mod schema;


pub use plan::{PlanNode, Transition};
pub use schema::{
    EnumEntry, EnumTable, Enumeration, Fingerprint, Schema, BEHAVIOUR_ENUM, ENUM_TABLE,
    PREDICATE_ENUM,
};
