//! Graph tabs: one editable node-and-edge view per opened plan.
//!
//! A [`GraphView`] shows the child plans of its subject as nodes and the
//! subject's `src`/`dst` transitions as edges. Edits on the view (scratch
//! nodes, new connections) are transient. [`GraphView::to_plan`] turns the
//! pending connections into transitions for a caller that wants to commit
//! them through [`crate::PlanTreeStore::replace_plan_at`].

use std::sync::Arc;

use log::debug;
use serde_json::Value;

use super::tree::{label_path, locate, node_at, resolve};
use crate::{
    error::{EditorError, Result},
    models::{PlanNode, Transition},
    store::{PlanTreeStore, StoreEvent, Subscription},
};

/// Port every plan node connects from.
pub const OUTPUT_PORT: &str = "out";
/// Port every plan node connects to.
pub const INPUT_PORT: &str = "in";

const COLUMNS: usize = 4;
const COLUMN_WIDTH: f64 = 200.0;
const ROW_HEIGHT: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Canvas coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn grid(slot: usize) -> Self {
        Self {
            x: (slot % COLUMNS) as f64 * COLUMN_WIDTH,
            y: (slot / COLUMNS) as f64 * ROW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Stands for a child plan of the subject
    Plan,
    /// Added on the canvas, not part of the tree
    Scratch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub kind: NodeKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: NodeId,
    pub from_port: String,
    pub to: NodeId,
    pub to_port: String,
    pub predicate: Option<Value>,
    /// Added on the canvas and not yet written back
    pub pending: bool,
}

/// Scalar fields of the selected plan, shown next to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDetails {
    pub name: String,
    pub behaviours: Vec<String>,
    pub run_interval: u64,
    pub active: bool,
}

impl From<&PlanNode> for PlanDetails {
    fn from(plan: &PlanNode) -> Self {
        Self {
            name: plan.name.clone(),
            behaviours: plan.behaviour_names().map(str::to_string).collect(),
            run_interval: plan.run_interval,
            active: plan.active,
        }
    }
}

/// Editing surface bound to one plan of one tree snapshot.
#[derive(Debug, Clone)]
pub struct GraphView {
    root: Arc<PlanNode>,
    index_path: Vec<usize>,
    labels: Vec<String>,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl GraphView {
    fn bind(root: Arc<PlanNode>, index_path: Vec<usize>) -> Option<Self> {
        let labels = label_path(&root, &index_path)?;
        let mut view = Self {
            root,
            index_path,
            labels,
            nodes: Vec::new(),
            edges: Vec::new(),
        };
        view.project();
        Some(view)
    }

    fn project(&mut self) {
        let Some(plan) = node_at(&self.root, &self.index_path) else {
            return;
        };

        let nodes: Vec<GraphNode> = plan
            .plans
            .iter()
            .enumerate()
            .map(|(slot, child)| GraphNode {
                id: NodeId(slot),
                label: child.name.clone(),
                kind: NodeKind::Plan,
                position: Position::grid(slot),
            })
            .collect();

        let lookup = |name: &str| {
            nodes
                .iter()
                .find(|node| node.label == name)
                .map(|node| node.id)
        };

        let mut edges = Vec::new();
        for transition in plan.typed_transitions() {
            for src in &transition.src {
                for dst in &transition.dst {
                    match (lookup(src), lookup(dst)) {
                        (Some(from), Some(to)) => edges.push(GraphEdge {
                            from,
                            from_port: OUTPUT_PORT.to_string(),
                            to,
                            to_port: INPUT_PORT.to_string(),
                            predicate: Some(transition.predicate.clone()),
                            pending: false,
                        }),
                        _ => debug!("Skipping transition {src} -> {dst} in '{}'", plan.name),
                    }
                }
            }
        }

        self.nodes = nodes;
        self.edges = edges;
    }

    /// The plan this view edits.
    pub fn plan(&self) -> Option<&PlanNode> {
        node_at(&self.root, &self.index_path)
    }

    /// Label path of the subject, empty for the root.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Tree snapshot the view is bound to.
    pub fn snapshot(&self) -> &Arc<PlanNode> {
        &self.root
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// First plan node with the given label.
    pub fn node_by_label(&self, label: &str) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|node| node.kind == NodeKind::Plan && node.label == label)
    }

    /// Adds an empty scratch node; the tree is not touched.
    pub fn add_node_at(&mut self, position: Position) -> NodeId {
        let id = NodeId(self.nodes.iter().map(|node| node.id.0 + 1).max().unwrap_or(0));
        self.nodes.push(GraphNode {
            id,
            label: String::new(),
            kind: NodeKind::Scratch,
            position,
        });
        id
    }

    /// Adds an edge. Every request is accepted, cycles and duplicates included.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: impl Into<String>,
        to: NodeId,
        to_port: impl Into<String>,
    ) -> usize {
        self.edges.push(GraphEdge {
            from,
            from_port: from_port.into(),
            to,
            to_port: to_port.into(),
            predicate: None,
            pending: true,
        });
        self.edges.len() - 1
    }

    /// Sets the predicate written back for an edge.
    pub fn set_edge_predicate(&mut self, edge: usize, predicate: Value) -> bool {
        match self.edges.get_mut(edge) {
            Some(edge) => {
                edge.predicate = Some(predicate);
                true
            }
            None => false,
        }
    }

    /// Pending edges between plan nodes, as single-source transitions.
    pub fn pending_transitions(&self) -> Vec<Transition> {
        self.edges
            .iter()
            .filter(|edge| edge.pending)
            .filter_map(|edge| {
                let from = self.node(edge.from).filter(|n| n.kind == NodeKind::Plan)?;
                let to = self.node(edge.to).filter(|n| n.kind == NodeKind::Plan)?;
                Some(Transition {
                    src: vec![from.label.clone()],
                    dst: vec![to.label.clone()],
                    predicate: edge.predicate.clone().unwrap_or(Value::Null),
                })
            })
            .collect()
    }

    /// Copy of the subject with pending transitions appended.
    pub fn to_plan(&self) -> Option<PlanNode> {
        let mut plan = self.plan()?.clone();
        plan.transitions
            .extend(self.pending_transitions().iter().map(Transition::to_value));
        Some(plan)
    }

    /// Rebinds to a new snapshot, discarding canvas edits.
    ///
    /// The old position is kept while it still carries the same labels, so a
    /// tab on a later duplicate sibling stays there. Otherwise the plan is
    /// looked up by label path.
    fn rebind(&mut self, root: &Arc<PlanNode>) -> bool {
        let current = label_path(root, &self.index_path);
        let index_path = if current.as_deref() == Some(self.labels.as_slice()) {
            self.index_path.clone()
        } else {
            let Some(index_path) = resolve(root, &self.labels).and_then(|plan| locate(root, plan))
            else {
                return false;
            };
            index_path
        };
        self.root = Arc::clone(root);
        self.index_path = index_path;
        self.project();
        true
    }

    fn is_bound_to(&self, root: &Arc<PlanNode>, index_path: &[usize]) -> bool {
        Arc::ptr_eq(&self.root, root) && self.index_path == index_path
    }
}

/// Open graph tabs, at most one per plan.
#[derive(Default)]
pub struct TabManager {
    tabs: Vec<GraphView>,
    active: Option<usize>,
    details: Option<PlanDetails>,
    events: Option<Subscription>,
}

impl TabManager {
    /// Tab manager that is not connected to a store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tab manager that follows the store's tree changes.
    pub fn attached(store: &PlanTreeStore) -> Self {
        Self {
            events: Some(store.subscribe()),
            ..Self::default()
        }
    }

    /// Opens `plan`, a node inside `root`, or focuses its existing tab.
    ///
    /// Tabs are matched by identity within the snapshot, never by name.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::PlanNotFound` if `plan` is not part of `root`.
    pub fn open(&mut self, root: &Arc<PlanNode>, plan: &PlanNode) -> Result<usize> {
        let index_path = locate(root, plan).ok_or_else(|| EditorError::PlanNotFound {
            path: plan.name.clone(),
        })?;

        let tab = match self
            .tabs
            .iter()
            .position(|tab| tab.is_bound_to(root, &index_path))
        {
            Some(tab) => tab,
            None => {
                let view = GraphView::bind(Arc::clone(root), index_path).ok_or_else(|| {
                    EditorError::PlanNotFound {
                        path: plan.name.clone(),
                    }
                })?;
                self.tabs.push(view);
                self.tabs.len() - 1
            }
        };

        self.active = Some(tab);
        self.details = Some(PlanDetails::from(plan));
        Ok(tab)
    }

    /// Resolves a label path in `root` and opens the plan found there.
    pub fn open_path<S: AsRef<str>>(&mut self, root: &Arc<PlanNode>, path: &[S]) -> Result<usize> {
        let plan = resolve(root, path).ok_or_else(|| EditorError::PlanNotFound {
            path: format!(
                "/{}",
                path.iter().map(|l| l.as_ref()).collect::<Vec<_>>().join("/")
            ),
        })?;
        self.open(root, plan)
    }

    /// Closes the active tab, discarding its edits.
    pub fn close_active(&mut self) -> Option<GraphView> {
        let index = self.active?;
        let closed = self.tabs.remove(index);
        self.focus_after_removal(index);
        Some(closed)
    }

    fn focus_after_removal(&mut self, removed: usize) {
        self.active = match self.active {
            _ if self.tabs.is_empty() => None,
            Some(active) if active > removed => Some(active - 1),
            Some(active) => Some(active.min(self.tabs.len() - 1)),
            None => None,
        };
        self.details = self.active_view().and_then(GraphView::plan).map(PlanDetails::from);
    }

    pub fn tabs(&self) -> &[GraphView] {
        &self.tabs
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_view(&self) -> Option<&GraphView> {
        self.tabs.get(self.active?)
    }

    pub fn active_view_mut(&mut self) -> Option<&mut GraphView> {
        self.tabs.get_mut(self.active?)
    }

    /// Detail panel contents for the selected plan.
    pub fn details(&self) -> Option<&PlanDetails> {
        self.details.as_ref()
    }

    /// Applies pending store events; returns whether any tab changed.
    ///
    /// Tabs follow their plan into the new snapshot. Tabs whose plan no
    /// longer exists, or that land on a plan an earlier tab already shows,
    /// are closed.
    pub fn sync(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };
        let latest = events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::PlanTreeChanged { tree, .. } => Some(tree),
                StoreEvent::SchemaChanged { .. } => None,
            })
            .last();
        let Some(root) = latest else {
            return false;
        };

        let mut index = 0;
        while index < self.tabs.len() {
            let keep = self.tabs[index].rebind(&root)
                && !self.tabs[..index]
                    .iter()
                    .any(|tab| tab.index_path == self.tabs[index].index_path);
            if keep {
                index += 1;
            } else {
                debug!("Closing tab for /{}", self.tabs[index].labels.join("/"));
                self.tabs.remove(index);
                if self.active == Some(index) {
                    self.active = None;
                }
                self.focus_after_removal(index);
            }
        }
        if self.active.is_none() && !self.tabs.is_empty() {
            self.active = Some(0);
        }
        self.details = self.active_view().and_then(GraphView::plan).map(PlanDetails::from);
        true
    }
}
