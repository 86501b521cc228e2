//! Plan node model and tree editing helpers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One node of the plan tree.
///
/// Children are owned by their parent; the root is owned by the
/// [`crate::PlanTreeStore`]. Keys not modelled here (for instance a `data`
/// blob written by the runtime library) are kept in `extra` so that a
/// load/save cycle does not drop them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanNode {
    /// Identifier, unique among siblings by convention
    pub name: String,

    /// Whether the plan is currently enabled
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,

    /// Tick period between runs; never evaluated by the editor
    #[serde(default, deserialize_with = "null_as_default")]
    pub run_interval: u64,

    /// Selected behaviours with their optional parameter payloads
    pub behaviour: Map<String, Value>,

    /// Transition descriptors, kept as opaque JSON
    pub transitions: Vec<Value>,

    /// Child plans in display order
    pub plans: Vec<PlanNode>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reads an explicit `null` the same way as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PlanNode {
    /// Creates an inactive plan with every required field populated.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: false,
            run_interval: 0,
            behaviour: Map::new(),
            transitions: Vec::new(),
            plans: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Adds a behaviour without parameters, returning `self` for chaining.
    pub fn with_behaviour(mut self, behaviour: impl Into<String>) -> Self {
        self.behaviour.insert(behaviour.into(), Value::Null);
        self
    }

    /// Appends a child plan, returning `self` for chaining.
    pub fn with_plan(mut self, plan: PlanNode) -> Self {
        self.plans.push(plan);
        self
    }

    /// Position of the first child named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.plans.iter().position(|plan| plan.name == name)
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&PlanNode> {
        self.plans.iter().find(|plan| plan.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut PlanNode> {
        self.plans.iter_mut().find(|plan| plan.name == name)
    }

    /// Inserts a child plan.
    ///
    /// A child with the same name is replaced in place; otherwise the plan is
    /// appended so that existing sibling order is kept.
    pub fn insert(&mut self, plan: PlanNode) -> &mut PlanNode {
        let index = match self.position(&plan.name) {
            Some(index) => {
                self.plans[index] = plan;
                index
            }
            None => {
                self.plans.push(plan);
                self.plans.len() - 1
            }
        };
        &mut self.plans[index]
    }

    /// Removes and returns the first child named `name`.
    pub fn remove(&mut self, name: &str) -> Option<PlanNode> {
        let index = self.position(name)?;
        Some(self.plans.remove(index))
    }

    /// Walks `path` down from this node, first match wins at every step.
    pub fn descendant<S: AsRef<str>>(&self, path: &[S]) -> Option<&PlanNode> {
        path.iter()
            .try_fold(self, |node, label| node.child(label.as_ref()))
    }

    pub fn descendant_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut PlanNode> {
        let mut node = self;
        for label in path {
            node = node.child_mut(label.as_ref())?;
        }
        Some(node)
    }

    /// Number of plans in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.plans.iter().map(PlanNode::count).sum::<usize>()
    }

    /// Behaviour names in document order.
    pub fn behaviour_names(&self) -> impl Iterator<Item = &str> {
        self.behaviour.keys().map(String::as_str)
    }

    /// Transitions that use the `src`/`dst`/`predicate` layout.
    pub fn typed_transitions(&self) -> impl Iterator<Item = Transition> + '_ {
        self.transitions.iter().filter_map(Transition::from_value)
    }
}

/// Transition from `src` plans to `dst` plans upon the result of `predicate`.
///
/// This is the layout the plan runtime writes; the editor never evaluates the
/// predicate and treats other layouts as opaque.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub src: Vec<String>,
    pub dst: Vec<String>,
    pub predicate: Value,
}

impl Transition {
    /// Reads a transition from JSON, `None` when the shape does not match.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "src": self.src,
            "dst": self.dst,
            "predicate": self.predicate,
        })
    }

    /// Variant name of the predicate.
    ///
    /// Predicates are stored either as a bare string or as an object with a
    /// single key naming the variant.
    pub fn predicate_name(&self) -> Option<&str> {
        match &self.predicate {
            Value::String(name) => Some(name),
            Value::Object(map) if map.len() == 1 => map.keys().next().map(String::as_str),
            _ => None,
        }
    }
}
