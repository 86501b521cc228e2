//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper handles the empty case with a one-line message.

use std::fmt;

use crate::{projection::BehaviourSelector, validation::Finding};

/// Newtype wrapper for displaying lint findings.
///
/// # Examples
///
/// ```rust
/// use plantree_core::{display::Findings, validation::Finding};
///
/// let findings = Findings(vec![Finding {
///     path: "execute".to_string(),
///     message: "behaviour 'Patrol' is not in BehaviourEnum".to_string(),
/// }]);
/// assert!(findings.to_string().contains("- execute: behaviour 'Patrol'"));
/// assert_eq!(Findings(vec![]).to_string(), "No problems found.\n");
/// ```
pub struct Findings(pub Vec<Finding>);

impl Findings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Findings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No problems found.");
        }
        for finding in &self.0 {
            writeln!(f, "- {finding}")?;
        }
        Ok(())
    }
}

/// Wrapper for displaying a selector's options with the selection marked.
pub struct BehaviourOptions<'a>(pub &'a BehaviourSelector);

impl fmt::Display for BehaviourOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = self.0.options();
        if options.is_empty() {
            return writeln!(f, "No behaviours defined.");
        }
        for (position, option) in options.iter().enumerate() {
            if self.0.selected() == Some(position) {
                writeln!(f, "- **{}: {}** (selected)", option.index, option.label)?;
            } else {
                writeln!(f, "- {}: {}", option.index, option.label)?;
            }
        }
        Ok(())
    }
}
