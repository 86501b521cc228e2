//! The plan tree store: single source of truth for the tree and the schema.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Import text    │    │  PlanTreeStore  │    │   Projectors    │
//! │ (CLI, dialogs)  │───▶│ validate, save, │───▶│ (tree, graph,   │
//! │                 │    │  swap, notify   │    │  selectors)     │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every write goes through [`PlanTreeStore::replace_plan_tree`] or
//! [`PlanTreeStore::replace_schema`]. A replacement is all-or-nothing: the
//! candidate is validated and persisted before the in-memory snapshot is
//! swapped, so a rejected document or a failed write leaves both the stored
//! state and the observers untouched.
//!
//! Observers register with [`PlanTreeStore::subscribe`] and receive
//! [`StoreEvent`]s carrying complete `Arc` snapshots, never a partially
//! replaced tree.
//!
//! # Examples
//!
//! ```rust
//! use plantree_core::{
//!     settings::{BundledDefaults, MemorySettings},
//!     PlanTreeStore, StoreEvent,
//! };
//! use serde_json::json;
//!
//! # fn example() -> plantree_core::Result<()> {
//! let mut store = PlanTreeStore::open(
//!     Box::new(MemorySettings::new()),
//!     &BundledDefaults::builtin(),
//! )?;
//! let mut events = store.subscribe();
//!
//! store.replace_plan_tree(&json!({
//!     "name": "root",
//!     "behaviour": {"SequenceBehaviour": null},
//!     "transitions": [],
//!     "plans": []
//! }))?;
//!
//! assert!(matches!(events.try_next(), Some(StoreEvent::PlanTreeChanged { .. })));
//! assert_eq!(store.get_plan_tree().name, "root");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    error::{EditorError, Result},
    models::{Fingerprint, PlanNode, Schema},
    settings::{Settings, SettingsSource, PLAN_TREE_KEY, SCHEMA_KEY},
    validation::{validate_plan, validate_schema},
};

pub mod builder;

#[cfg(test)]
mod tests;

pub use builder::StoreBuilder;

/// Number of undelivered events kept per subscriber before it lags.
const EVENT_CAPACITY: usize = 64;

/// Change notification fanned out to every subscriber.
#[derive(Debug, Clone)]
pub enum StoreEvent {
    /// The whole plan tree was replaced
    PlanTreeChanged {
        tree: Arc<PlanNode>,
        generation: u64,
    },
    /// The schema was replaced
    SchemaChanged {
        schema: Arc<Schema>,
        fingerprint: Fingerprint,
    },
}

/// Receiving end of the store's notifications.
pub struct Subscription {
    rx: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    /// Next pending event, `None` when there is nothing to deliver.
    ///
    /// A subscriber that fell behind skips the events it missed; later
    /// events still carry full snapshots, so nothing needs replaying.
    pub fn try_next(&mut self) -> Option<StoreEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Observer lagged behind, skipped {skipped} store events");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// All pending events in emission order.
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// Holder of the current plan tree and schema.
pub struct PlanTreeStore {
    settings: Box<dyn Settings>,
    plan_tree: Arc<PlanNode>,
    schema: Arc<Schema>,
    fingerprint: Fingerprint,
    generation: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl PlanTreeStore {
    /// Loads both documents, preferring `settings` over `defaults`.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::StartupDataMissing` when neither source has a
    /// document, and a validation error when the loaded document is invalid.
    pub fn open<D>(settings: Box<dyn Settings>, defaults: &D) -> Result<Self>
    where
        D: SettingsSource + ?Sized,
    {
        let tree_value = load_document(settings.as_ref(), defaults, PLAN_TREE_KEY)?;
        let plan_tree = decode_plan_tree(&tree_value)?;

        let schema_value = load_document(settings.as_ref(), defaults, SCHEMA_KEY)?;
        let schema = decode_schema(&schema_value)?;
        let fingerprint = Fingerprint::of(&schema)?;

        info!(
            "Loaded plan tree '{}' ({} plans), schema {}",
            plan_tree.name,
            plan_tree.count(),
            fingerprint.short()
        );

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            settings,
            plan_tree: Arc::new(plan_tree),
            schema: Arc::new(schema),
            fingerprint,
            generation: 0,
            events,
        })
    }

    /// Current root snapshot.
    pub fn get_plan_tree(&self) -> Arc<PlanNode> {
        Arc::clone(&self.plan_tree)
    }

    /// Current schema snapshot.
    pub fn get_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn schema_fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Number of successful plan tree replacements since the store opened.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Registers a new observer.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.events.subscribe(),
        }
    }

    /// Validates `candidate`, persists it and makes it the current tree.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found, or a persistence error.
    /// The stored tree is unchanged and no event is emitted on failure.
    pub fn replace_plan_tree(&mut self, candidate: &Value) -> Result<()> {
        let plan_tree = decode_plan_tree(candidate)?;
        self.commit_plan_tree(plan_tree)
    }

    /// Validates `candidate`, persists it and makes it the current schema.
    ///
    /// # Errors
    ///
    /// Returns `EditorError::MissingSchemaKey` when an enumeration is
    /// missing, or a persistence error. State is unchanged on failure.
    pub fn replace_schema(&mut self, candidate: &Value) -> Result<()> {
        let schema = decode_schema(candidate)?;
        let fingerprint = Fingerprint::of(&schema)?;
        self.persist(SCHEMA_KEY, &serde_json::to_value(&schema)?)?;

        let schema = Arc::new(schema);
        self.schema = Arc::clone(&schema);
        self.fingerprint = fingerprint.clone();
        info!("Schema replaced ({})", fingerprint.short());

        self.notify(StoreEvent::SchemaChanged {
            schema,
            fingerprint,
        });
        Ok(())
    }

    /// Parses JSON text and replaces the plan tree with it.
    pub fn import_plan_tree(&mut self, text: &str) -> Result<()> {
        self.replace_plan_tree(&parse_document(text)?)
    }

    /// Parses JSON text and replaces the schema with it.
    pub fn import_schema(&mut self, text: &str) -> Result<()> {
        self.replace_schema(&parse_document(text)?)
    }

    /// Parses a single plan and inserts it under the plan at `parent`.
    ///
    /// A child with the same name is replaced in place. The resulting tree
    /// goes through the same validation and persistence as a full import.
    /// Returns the inserted plan.
    pub fn import_plan<S: AsRef<str>>(&mut self, parent: &[S], text: &str) -> Result<PlanNode> {
        let plan = decode_plan_tree(&parse_document(text)?)?;

        let mut plan_tree = PlanNode::clone(&self.plan_tree);
        let inserted = plan_tree
            .descendant_mut(parent)
            .ok_or_else(|| not_found(parent))?
            .insert(plan)
            .clone();
        self.commit_plan_tree(plan_tree)?;
        Ok(inserted)
    }

    /// Removes the plan at `path` and returns it.
    pub fn remove_plan<S: AsRef<str>>(&mut self, path: &[S]) -> Result<PlanNode> {
        let Some((name, parent)) = path.split_last() else {
            return Err(EditorError::RootRemoval);
        };

        let mut plan_tree = PlanNode::clone(&self.plan_tree);
        let removed = plan_tree
            .descendant_mut(parent)
            .and_then(|node| node.remove(name.as_ref()))
            .ok_or_else(|| not_found(path))?;
        self.commit_plan_tree(plan_tree)?;
        Ok(removed)
    }

    /// Replaces the plan at `path` (the root for an empty path).
    pub fn replace_plan_at<S: AsRef<str>>(&mut self, path: &[S], plan: PlanNode) -> Result<()> {
        let mut plan_tree = PlanNode::clone(&self.plan_tree);
        let slot = plan_tree
            .descendant_mut(path)
            .ok_or_else(|| not_found(path))?;
        *slot = plan;
        self.replace_plan_tree(&serde_json::to_value(&plan_tree)?)
    }

    /// Current tree as pretty-printed JSON.
    pub fn export_plan_tree(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.plan_tree.as_ref())?)
    }

    /// Current schema as pretty-printed JSON.
    pub fn export_schema(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.schema.as_ref())?)
    }

    /// One plan and its subtree as pretty-printed JSON.
    pub fn export_plan<S: AsRef<str>>(&self, path: &[S]) -> Result<String> {
        let plan = self
            .plan_tree
            .descendant(path)
            .ok_or_else(|| not_found(path))?;
        Ok(serde_json::to_string_pretty(plan)?)
    }

    fn commit_plan_tree(&mut self, plan_tree: PlanNode) -> Result<()> {
        self.persist(PLAN_TREE_KEY, &serde_json::to_value(&plan_tree)?)?;

        let tree = Arc::new(plan_tree);
        self.plan_tree = Arc::clone(&tree);
        self.generation += 1;
        info!(
            "Plan tree replaced: '{}' ({} plans, generation {})",
            tree.name,
            tree.count(),
            self.generation
        );

        self.notify(StoreEvent::PlanTreeChanged {
            tree,
            generation: self.generation,
        });
        Ok(())
    }

    fn persist(&mut self, key: &str, value: &Value) -> Result<()> {
        self.settings.save(key, value).inspect_err(|e| {
            warn!("Failed to persist '{key}', keeping previous state: {e}");
        })
    }

    fn notify(&self, event: StoreEvent) {
        if self.events.send(event).is_err() {
            debug!("No observers registered for store events");
        }
    }
}

/// Parses JSON text, keeping the error position for display.
pub fn parse_document(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| EditorError::parse(&e))
}

fn load_document<U, D>(user: &U, defaults: &D, key: &str) -> Result<Value>
where
    U: SettingsSource + ?Sized,
    D: SettingsSource + ?Sized,
{
    if let Some(value) = user.load(key)? {
        debug!("Using stored '{key}'");
        return Ok(value);
    }
    if let Some(value) = defaults.load(key)? {
        info!("No stored '{key}', falling back to bundled default");
        return Ok(value);
    }
    Err(EditorError::StartupDataMissing {
        key: key.to_string(),
    })
}

fn decode_plan_tree(candidate: &Value) -> Result<PlanNode> {
    validate_plan(candidate)?;
    Ok(PlanNode::deserialize(candidate)?)
}

fn decode_schema(candidate: &Value) -> Result<Schema> {
    validate_schema(candidate)?;
    Ok(Schema::deserialize(candidate)?)
}

fn not_found<S: AsRef<str>>(path: &[S]) -> EditorError {
    let labels: Vec<&str> = path.iter().map(|label| label.as_ref()).collect();
    EditorError::PlanNotFound {
        path: format!("/{}", labels.join("/")),
    }
}
