//! Error types for the plan tree editor.

use std::path::PathBuf;

use thiserror::Error;

/// Comprehensive error type for all editor operations.
///
/// Every variant renders as a single line suitable for showing to the user
/// directly; no structured error code is exposed beyond the variant itself.
#[derive(Error, Debug)]
pub enum EditorError {
    /// JSON text could not be parsed
    #[error("Invalid JSON: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },
    /// A plan entry was not a JSON object
    #[error("{}", describe_malformed(.node.as_deref()))]
    MalformedDocument { node: Option<String> },
    /// A required plan field is absent or null
    #[error("Missing field '{field}'{}", in_plan(.node.as_deref()))]
    MissingField {
        field: &'static str,
        node: Option<String>,
    },
    /// A field is present but has the wrong shape
    #[error("Invalid field '{field}'{}: {reason}", in_plan(.node.as_deref()))]
    InvalidField {
        field: String,
        node: Option<String>,
        reason: String,
    },
    /// Schema document lacks one of its enumerations
    #[error("Schema is missing the '{key}' enumeration")]
    MissingSchemaKey { key: &'static str },
    /// Neither the user location nor the bundled defaults provide a document
    #[error("No stored or bundled data found for '{key}'")]
    StartupDataMissing { key: String },
    /// No plan at the given label path
    #[error("Plan '{path}' not found")]
    PlanNotFound { path: String },
    /// The root plan was the target of a removal
    #[error("The root plan cannot be removed")]
    RootRemoval,
    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },
    /// XDG directory specification errors
    #[error("XDG directory error: {0}")]
    XdgDirectory(String),
    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },
}

fn in_plan(node: Option<&str>) -> String {
    node.map(|name| format!(" in plan '{name}'"))
        .unwrap_or_default()
}

fn describe_malformed(node: Option<&str>) -> String {
    match node {
        Some(parent) => format!("Malformed document: a child of plan '{parent}' is not an object"),
        None => "Malformed document: expected a JSON object".to_string(),
    }
}

/// Builder for creating field validation errors.
pub struct InvalidFieldBuilder {
    field: String,
    node: Option<String>,
}

impl InvalidFieldBuilder {
    /// Create a new invalid field error builder.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            node: None,
        }
    }

    /// Attach the name of the plan that holds the field.
    pub fn in_node(mut self, node: Option<&str>) -> Self {
        self.node = node.map(str::to_string);
        self
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> EditorError {
        EditorError::InvalidField {
            field: self.field,
            node: self.node,
            reason: reason.into(),
        }
    }
}

impl EditorError {
    /// Creates a builder for field validation errors.
    pub fn invalid_field(field: impl Into<String>) -> InvalidFieldBuilder {
        InvalidFieldBuilder::new(field)
    }

    /// Converts a `serde_json` parse failure into a positioned parse error.
    pub fn parse(err: &serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }

    /// Name of the plan the error refers to, when it is known.
    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::MalformedDocument { node }
            | Self::MissingField { node, .. }
            | Self::InvalidField { node, .. } => node.as_deref(),
            _ => None,
        }
    }

    /// Whether the error came from document validation rather than I/O.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. }
                | Self::MalformedDocument { .. }
                | Self::MissingField { .. }
                | Self::InvalidField { .. }
                | Self::MissingSchemaKey { .. }
        )
    }
}

/// Extension trait mapping I/O results onto [`EditorError::FileSystem`].
pub trait IoResultExt<T> {
    /// Attach the path the I/O operation was working on.
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn at_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| EditorError::FileSystem {
            path: path.into(),
            source,
        })
    }
}

/// Result type alias for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_plan() {
        let err = EditorError::MissingField {
            field: "plans",
            node: Some("child".to_string()),
        };
        assert_eq!(err.to_string(), "Missing field 'plans' in plan 'child'");
        assert_eq!(err.node_name(), Some("child"));
    }

    #[test]
    fn test_missing_name_has_no_plan() {
        let err = EditorError::MissingField {
            field: "name",
            node: None,
        };
        assert_eq!(err.to_string(), "Missing field 'name'");
        assert_eq!(err.node_name(), None);
    }

    #[test]
    fn test_parse_error_keeps_position() {
        let source = serde_json::from_str::<serde_json::Value>("{\n  \"name\": }")
            .expect_err("invalid json");
        let err = EditorError::parse(&source);
        match &err {
            EditorError::Parse { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_validation());
    }

    #[test]
    fn test_invalid_field_builder() {
        let err = EditorError::invalid_field("run_interval")
            .in_node(Some("root"))
            .with_reason("expected a non-negative integer");
        assert_eq!(
            err.to_string(),
            "Invalid field 'run_interval' in plan 'root': expected a non-negative integer"
        );
    }

    #[test]
    fn test_root_removal_is_not_validation() {
        let err = EditorError::RootRemoval;
        assert!(!err.is_validation());
        assert_eq!(err.node_name(), None);
    }
}
