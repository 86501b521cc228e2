//! Display implementations for domain models.
//!
//! Kept apart from the model definitions so that the models stay plain data.
//! Everything renders as markdown for the terminal renderer.

use std::fmt;

use crate::{
    models::{EnumTable, Fingerprint, PlanNode, Schema, Transition},
    projection::{DisplayNode, DisplayTree, GraphView, NodeKind, PlanDetails},
};

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.src.join(", "), self.dst.join(", "))?;
        match self.predicate_name() {
            Some(name) => write!(f, " when {name}"),
            None => write!(f, " when {}", self.predicate),
        }
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name)?;
        writeln!(f)?;

        writeln!(f, "- Active: {}", yes_no(self.active))?;
        writeln!(f, "- Run interval: {}", self.run_interval)?;
        let behaviours: Vec<&str> = self.behaviour_names().collect();
        if behaviours.is_empty() {
            writeln!(f, "- Behaviours: none")?;
        } else {
            writeln!(f, "- Behaviours: {}", behaviours.join(", "))?;
        }
        for (key, value) in &self.extra {
            writeln!(f, "- {key}: {value}")?;
        }

        if !self.transitions.is_empty() {
            writeln!(f, "\n## Transitions")?;
            writeln!(f)?;
            for value in &self.transitions {
                match Transition::from_value(value) {
                    Some(transition) => writeln!(f, "- {transition}")?,
                    None => writeln!(f, "- `{value}`")?,
                }
            }
        }

        if self.plans.is_empty() {
            writeln!(f, "\nNo child plans.")?;
        } else {
            writeln!(f, "\n## Plans")?;
            writeln!(f)?;
            for plan in &self.plans {
                writeln!(f, "- {} ({} plans)", plan.name, plan.count())?;
            }
        }

        Ok(())
    }
}

fn fmt_display_node(node: &DisplayNode, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let indent = "  ".repeat(depth);
    if node.active {
        writeln!(f, "{indent}- {}", node.label)?;
    } else {
        writeln!(f, "{indent}- {} *(inactive)*", node.label)?;
    }
    for child in &node.children {
        fmt_display_node(child, depth + 1, f)?;
    }
    Ok(())
}

impl fmt::Display for DisplayTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_display_node(&self.root, 0, f)
    }
}

impl fmt::Display for EnumTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No entries.");
        }
        for entry in self.entries() {
            writeln!(f, "- {}: {}", entry.index, entry.aliases.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Behaviours")?;
        writeln!(f)?;
        write!(f, "{}", self.behaviour_table())?;
        writeln!(f, "\n## Predicates")?;
        writeln!(f)?;
        write!(f, "{}", self.predicate_table())
    }
}

impl fmt::Display for PlanDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## {}", self.name)?;
        writeln!(f)?;
        writeln!(f, "- Behaviour: {}", self.behaviours.join(", "))?;
        writeln!(f, "- Run interval: {}", self.run_interval)?;
        writeln!(f, "- Active: {}", yes_no(self.active))
    }
}

impl fmt::Display for GraphView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Graph of /{}", self.labels().join("/"))?;
        writeln!(f)?;

        if self.nodes().is_empty() {
            writeln!(f, "No nodes.")?;
            return Ok(());
        }

        writeln!(f, "## Nodes")?;
        writeln!(f)?;
        for node in self.nodes() {
            let label = match node.kind {
                NodeKind::Plan => node.label.as_str(),
                NodeKind::Scratch => "(scratch)",
            };
            writeln!(
                f,
                "- [{}] {label} at ({}, {})",
                node.id.0, node.position.x, node.position.y
            )?;
        }

        if !self.edges().is_empty() {
            writeln!(f, "\n## Edges")?;
            writeln!(f)?;
            let name = |id| self.node(id).map_or("?", |n| n.label.as_str());
            for edge in self.edges() {
                write!(
                    f,
                    "- {}:{} → {}:{}",
                    name(edge.from),
                    edge.from_port,
                    name(edge.to),
                    edge.to_port
                )?;
                if let Some(predicate) = &edge.predicate {
                    write!(f, " when {predicate}")?;
                }
                if edge.pending {
                    write!(f, " *(pending)*")?;
                }
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{models::EnumEntry, projection::TabManager};

    fn create_test_plan() -> PlanNode {
        let mut plan = PlanNode::new("root")
            .with_behaviour("SequenceBehaviour")
            .with_plan(PlanNode::new("prepare"))
            .with_plan(PlanNode::new("execute"));
        plan.active = true;
        plan.transitions.push(json!({
            "src": ["prepare"], "dst": ["execute"], "predicate": {"AllSuccess": null}
        }));
        plan.transitions.push(json!(7));
        plan
    }

    #[test]
    fn test_plan_display() {
        let output = create_test_plan().to_string();
        assert!(output.starts_with("# root\n"));
        assert!(output.contains("- Active: yes"));
        assert!(output.contains("- Behaviours: SequenceBehaviour"));
        assert!(output.contains("- prepare → execute when AllSuccess"));
        assert!(output.contains("- `7`"));
        assert!(output.contains("- execute (1 plans)"));

        let leaf = PlanNode::new("leaf").to_string();
        assert!(leaf.contains("- Behaviours: none"));
        assert!(leaf.contains("No child plans."));
    }

    #[test]
    fn test_display_tree_marks_inactive() {
        let tree = crate::projection::project(&create_test_plan());
        let output = tree.to_string();
        assert_eq!(
            output,
            "- root\n  - prepare *(inactive)*\n  - execute *(inactive)*\n"
        );
    }

    #[test]
    fn test_schema_display() {
        let schema = Schema::new(
            [EnumEntry::new("1", ["SequenceBehaviour", "Sequence"])]
                .into_iter()
                .collect(),
            EnumTable::default(),
        );
        let output = schema.to_string();
        assert!(output.contains("- 1: SequenceBehaviour, Sequence"));
        assert!(output.contains("## Predicates\n\nNo entries."));
    }

    #[test]
    fn test_graph_display() {
        let root = Arc::new(create_test_plan());
        let mut tabs = TabManager::new();
        tabs.open(&root, &root).unwrap();
        let view = tabs.active_view_mut().unwrap();
        let edge = view.connect(
            crate::projection::NodeId(1),
            "out",
            crate::projection::NodeId(0),
            "in",
        );
        view.set_edge_predicate(edge, json!("Retry"));

        let output = view.to_string();
        assert!(output.starts_with("# Graph of /\n"));
        assert!(output.contains("- [1] execute at (200, 0)"));
        assert!(output.contains("- prepare:out → execute:in when {\"AllSuccess\":null}"));
        assert!(output.contains("- execute:out → prepare:in when \"Retry\" *(pending)*"));
    }
}
