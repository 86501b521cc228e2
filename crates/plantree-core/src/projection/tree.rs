//! Tree projection and label-path resolution.

use std::sync::Arc;

use crate::{
    models::PlanNode,
    store::{PlanTreeStore, StoreEvent, Subscription},
};

/// One row of the display tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayNode {
    pub label: String,
    pub active: bool,
    pub children: Vec<DisplayNode>,
}

/// Label hierarchy derived from a plan tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTree {
    pub root: DisplayNode,
}

impl DisplayTree {
    /// Label path of every node in pre-order, the root being the empty path.
    pub fn paths(&self) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        collect_paths(&self.root, &mut Vec::new(), &mut paths);
        paths
    }

    /// Number of display nodes, the root included.
    pub fn node_count(&self) -> usize {
        count_nodes(&self.root)
    }
}

fn collect_paths(node: &DisplayNode, prefix: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
    paths.push(prefix.clone());
    for child in &node.children {
        prefix.push(child.label.clone());
        collect_paths(child, prefix, paths);
        prefix.pop();
    }
}

fn count_nodes(node: &DisplayNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

/// Projects a plan tree, children in `plans` order.
pub fn project(root: &PlanNode) -> DisplayTree {
    DisplayTree {
        root: project_node(root),
    }
}

fn project_node(plan: &PlanNode) -> DisplayNode {
    DisplayNode {
        label: plan.name.clone(),
        active: plan.active,
        children: plan.plans.iter().map(project_node).collect(),
    }
}

/// Resolves a label path (root label excluded) back to its plan.
///
/// At every step the first child with a matching name wins, so the result
/// is only unambiguous when sibling names are unique.
pub fn resolve<'a, S: AsRef<str>>(root: &'a PlanNode, path: &[S]) -> Option<&'a PlanNode> {
    root.descendant(path)
}

/// Index path of `target` inside `root`, compared by reference identity.
pub fn locate(root: &PlanNode, target: &PlanNode) -> Option<Vec<usize>> {
    if std::ptr::eq(root, target) {
        return Some(Vec::new());
    }
    root.plans.iter().enumerate().find_map(|(index, child)| {
        locate(child, target).map(|mut path| {
            path.insert(0, index);
            path
        })
    })
}

/// Plan at an index path.
pub fn node_at<'a>(root: &'a PlanNode, index_path: &[usize]) -> Option<&'a PlanNode> {
    index_path
        .iter()
        .try_fold(root, |node, &index| node.plans.get(index))
}

/// Label path of the plan at an index path.
pub fn label_path(root: &PlanNode, index_path: &[usize]) -> Option<Vec<String>> {
    let mut node = root;
    let mut labels = Vec::with_capacity(index_path.len());
    for &index in index_path {
        node = node.plans.get(index)?;
        labels.push(node.name.clone());
    }
    Some(labels)
}

/// Display tree kept in step with the store.
///
/// The projection is recomputed in full whenever the tree changes.
pub struct TreeView {
    source: Arc<PlanNode>,
    tree: DisplayTree,
    generation: u64,
    events: Subscription,
}

impl TreeView {
    pub fn new(store: &PlanTreeStore) -> Self {
        let source = store.get_plan_tree();
        Self {
            tree: project(&source),
            source,
            generation: store.generation(),
            events: store.subscribe(),
        }
    }

    pub fn tree(&self) -> &DisplayTree {
        &self.tree
    }

    /// Snapshot the current projection was built from.
    pub fn source(&self) -> &Arc<PlanNode> {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves a selection against the projected snapshot.
    pub fn select<S: AsRef<str>>(&self, path: &[S]) -> Option<&PlanNode> {
        resolve(&self.source, path)
    }

    /// Applies pending store events; returns whether the projection changed.
    pub fn sync(&mut self) -> bool {
        let latest = self
            .events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::PlanTreeChanged { tree, generation } => Some((tree, generation)),
                StoreEvent::SchemaChanged { .. } => None,
            })
            .last();

        let Some((tree, generation)) = latest else {
            return false;
        };
        self.tree = project(&tree);
        self.source = tree;
        self.generation = generation;
        true
    }
}
