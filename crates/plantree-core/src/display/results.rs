//! Result wrapper types for displaying operation outcomes.
//!
//! Import and remove results carry the affected resource so the confirmation
//! can summarize it.

use std::fmt;

use crate::{
    models::{Fingerprint, PlanNode, Schema},
    params::PlanPath,
};

/// Wrapper type for displaying the result of import operations.
///
/// # Examples
///
/// ```rust
/// use plantree_core::{display::ImportResult, models::PlanNode, params::PlanPath};
///
/// let tree = PlanNode::new("root").with_plan(PlanNode::new("child"));
/// let result = ImportResult::new(tree);
/// assert!(result.to_string().starts_with("Imported plan tree 'root' (2 plans)"));
///
/// let result = ImportResult::under(PlanNode::new("leaf"), "/child".parse().unwrap());
/// assert!(result.to_string().starts_with("Imported plan 'leaf' under /child"));
/// ```
pub struct ImportResult<T> {
    pub resource: T,
    pub parent: Option<PlanPath>,
}

impl<T> ImportResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            parent: None,
        }
    }

    /// Result of importing a single plan below `parent`.
    pub fn under(resource: T, parent: PlanPath) -> Self {
        Self {
            resource,
            parent: Some(parent),
        }
    }
}

impl fmt::Display for ImportResult<PlanNode> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = &self.resource;
        match &self.parent {
            Some(parent) => writeln!(f, "Imported plan '{}' under {parent}", plan.name)?,
            None => writeln!(
                f,
                "Imported plan tree '{}' ({} plans)",
                plan.name,
                plan.count()
            )?,
        }
        writeln!(f)?;
        write!(f, "{plan}")
    }
}

impl fmt::Display for ImportResult<(Schema, Fingerprint)> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (schema, fingerprint) = &self.resource;
        writeln!(
            f,
            "Imported schema {} ({} behaviours, {} predicates)",
            fingerprint.short(),
            schema.behaviour_table().len(),
            schema.predicate_table().len()
        )?;
        writeln!(f)?;
        write!(f, "{schema}")
    }
}

/// Wrapper type for displaying the result of remove operations.
pub struct RemoveResult<T> {
    pub resource: T,
    pub path: PlanPath,
}

impl<T> RemoveResult<T> {
    pub fn new(resource: T, path: PlanPath) -> Self {
        Self { resource, path }
    }
}

impl fmt::Display for RemoveResult<PlanNode> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed = self.resource.count();
        if removed == 1 {
            writeln!(f, "Removed plan '{}' at {}", self.resource.name, self.path)
        } else {
            writeln!(
                f,
                "Removed plan '{}' at {} with {} descendants",
                self.resource.name,
                self.path,
                removed - 1
            )
        }
    }
}
