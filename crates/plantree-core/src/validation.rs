//! Validation gate for imported documents, plus an advisory lint pass.
//!
//! [`validate_plan`] is the contract every plan import goes through, whether
//! it carries a whole tree or a single plan: a depth-first, pre-order walk
//! that stops at the first problem. Required keys are checked in a fixed
//! order (`name`, `behaviour`, `transitions`, `plans`) so the reported error
//! is deterministic for a given document.
//!
//! [`lint`] runs over an already accepted tree and reports references the
//! schema does not know about. It never blocks an import.

use std::{collections::HashSet, fmt};

use serde_json::{Map, Value};

use crate::{
    error::{EditorError, Result},
    models::{PlanNode, Schema, BEHAVIOUR_ENUM, ENUM_TABLE, PREDICATE_ENUM},
};

/// Keys every plan node must carry, in the order they are checked.
pub const REQUIRED_PLAN_FIELDS: [&str; 4] = ["name", "behaviour", "transitions", "plans"];

/// Checks a plan document and all of its descendants.
pub fn validate_plan(candidate: &Value) -> Result<()> {
    validate_node(candidate, None)
}

fn validate_node(candidate: &Value, parent: Option<&str>) -> Result<()> {
    let Some(node) = candidate.as_object() else {
        return Err(EditorError::MalformedDocument {
            node: parent.map(str::to_string),
        });
    };

    let mut name = None;
    for field in REQUIRED_PLAN_FIELDS {
        if is_absent(node, field) {
            return Err(EditorError::MissingField {
                field,
                node: name.map(str::to_string),
            });
        }
        if field == "name" {
            name = Some(node[field].as_str().ok_or_else(|| {
                EditorError::invalid_field("name").with_reason("expected a string")
            })?);
        }
    }

    check_shape(node, name)?;

    if let Some(children) = node.get("plans").and_then(Value::as_array) {
        for child in children {
            validate_node(child, name)?;
        }
    }
    Ok(())
}

fn is_absent(node: &Map<String, Value>, field: &str) -> bool {
    node.get(field).map_or(true, Value::is_null)
}

fn check_shape(node: &Map<String, Value>, name: Option<&str>) -> Result<()> {
    let expect = |field: &str, ok: bool, reason: &str| {
        if ok {
            Ok(())
        } else {
            Err(EditorError::invalid_field(field)
                .in_node(name)
                .with_reason(reason))
        }
    };

    expect("behaviour", node["behaviour"].is_object(), "expected an object")?;
    expect("transitions", node["transitions"].is_array(), "expected an array")?;
    expect("plans", node["plans"].is_array(), "expected an array")?;

    if let Some(active) = node.get("active").filter(|v| !v.is_null()) {
        expect("active", active.is_boolean(), "expected a boolean")?;
    }
    if let Some(interval) = node.get("run_interval").filter(|v| !v.is_null()) {
        expect(
            "run_interval",
            interval.is_u64(),
            "expected a non-negative integer",
        )?;
    }
    Ok(())
}

/// Checks a schema document.
///
/// Both enumerations must be present, `BehaviourEnum` first. Alias tables are
/// optional, but when present they must map indices to strings or string
/// lists.
pub fn validate_schema(candidate: &Value) -> Result<()> {
    let Some(schema) = candidate.as_object() else {
        return Err(EditorError::MalformedDocument { node: None });
    };

    for key in [BEHAVIOUR_ENUM, PREDICATE_ENUM] {
        let Some(enumeration) = schema.get(key) else {
            return Err(EditorError::MissingSchemaKey { key });
        };
        check_enumeration(key, enumeration)?;
    }
    Ok(())
}

fn check_enumeration(key: &str, enumeration: &Value) -> Result<()> {
    let Some(enumeration) = enumeration.as_object() else {
        return Err(EditorError::invalid_field(key).with_reason("expected an object"));
    };
    let Some(table) = enumeration.get(ENUM_TABLE) else {
        return Ok(());
    };
    let field = format!("{key}.{ENUM_TABLE}");
    let Some(table) = table.as_object() else {
        return Err(EditorError::invalid_field(field).with_reason("expected an object"));
    };

    for (index, aliases) in table {
        let valid = match aliases {
            Value::String(_) => true,
            Value::Array(items) => items.iter().all(Value::is_string),
            _ => false,
        };
        if !valid {
            return Err(EditorError::invalid_field(field)
                .with_reason(format!("aliases of index '{index}' must be strings")));
        }
    }
    Ok(())
}

/// Advisory problem found by [`lint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Label path of the plan, `/`-separated, empty for the root
    pub path: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{path}: {}", self.message)
    }
}

/// Reports schema references and sibling names that import does not enforce.
pub fn lint(root: &PlanNode, schema: &Schema) -> Vec<Finding> {
    let mut findings = Vec::new();
    lint_node(root, schema, &mut Vec::new(), &mut findings);
    findings
}

fn lint_node<'a>(
    node: &'a PlanNode,
    schema: &Schema,
    path: &mut Vec<&'a str>,
    findings: &mut Vec<Finding>,
) {
    let mut report = |message: String| {
        findings.push(Finding {
            path: path.join("/"),
            message,
        });
    };

    for behaviour in node.behaviour_names() {
        if !schema.behaviour_table().contains_alias(behaviour) {
            report(format!("behaviour '{behaviour}' is not in {BEHAVIOUR_ENUM}"));
        }
    }

    let mut seen = HashSet::new();
    for child in &node.plans {
        if !seen.insert(child.name.as_str()) {
            report(format!(
                "duplicate child name '{}'; only the first is reachable by path",
                child.name
            ));
        }
    }

    for transition in node.typed_transitions() {
        for target in transition.src.iter().chain(&transition.dst) {
            if node.child(target).is_none() {
                report(format!("transition refers to unknown child '{target}'"));
            }
        }
        match transition.predicate_name() {
            Some(predicate) if !schema.predicate_table().contains_alias(predicate) => {
                report(format!("predicate '{predicate}' is not in {PREDICATE_ENUM}"));
            }
            _ => {}
        }
    }

    for child in &node.plans {
        path.push(&child.name);
        lint_node(child, schema, path, findings);
        path.pop();
    }
}
