//! Parameter types shared by the interfaces that drive the store.
//!
//! Plans are addressed by label path: the names of the plans walked from the
//! root, root excluded. On the command line a path is written with slashes,
//! e.g. `/execute/retry`; `/` addresses the root itself.
//!
//! ```rust
//! use plantree_core::params::PlanPath;
//!
//! let path: PlanPath = "/execute/retry".parse().unwrap();
//! assert_eq!(path.labels(), ["execute", "retry"]);
//! assert_eq!(path.to_string(), "/execute/retry");
//! assert!("/".parse::<PlanPath>().unwrap().is_root());
//! ```

use std::{convert::Infallible, fmt, str::FromStr};

/// Label path from the root to a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PlanPath(Vec<String>);

impl PlanPath {
    /// The root plan.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path of the parent plan, `None` for the root.
    pub fn parent(&self) -> Option<PlanPath> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// Path of the child named `label`.
    pub fn join(&self, label: impl Into<String>) -> PlanPath {
        let mut labels = self.0.clone();
        labels.push(label.into());
        Self(labels)
    }
}

impl From<&str> for PlanPath {
    /// Splits on `/`, ignoring empty segments.
    fn from(s: &str) -> Self {
        Self(
            s.split('/')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl FromStr for PlanPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for PlanPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl From<Vec<String>> for PlanPath {
    fn from(labels: Vec<String>) -> Self {
        Self(labels)
    }
}

impl AsRef<[String]> for PlanPath {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_empty_segments() {
        let path: PlanPath = "execute//retry/".parse().unwrap();
        assert_eq!(path.labels(), ["execute", "retry"]);
        assert_eq!(path.to_string(), "/execute/retry");
    }

    #[test]
    fn test_root_path() {
        let root: PlanPath = "".parse().unwrap();
        assert!(root.is_root());
        assert_eq!(root, PlanPath::root());
        assert_eq!(root.to_string(), "/");
        assert!(root.parent().is_none());
    }

    #[test]
    fn test_parent_and_join() {
        let path = PlanPath::root().join("execute").join("retry");
        assert_eq!(path.parent(), Some(PlanPath::from(vec!["execute".to_string()])));
        assert_eq!(path.parent().unwrap().parent(), Some(PlanPath::root()));
        assert_eq!(PlanPath::from("execute/retry"), path);
    }
}
