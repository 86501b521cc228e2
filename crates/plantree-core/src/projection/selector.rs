//! Behaviour choice list built from the schema.

use log::debug;

use crate::{
    models::{Fingerprint, Schema},
    store::{PlanTreeStore, StoreEvent, Subscription},
};

/// One selectable behaviour name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    /// Enumeration index the alias belongs to
    pub index: String,
    pub label: String,
}

/// Choice list over the schema's behaviour enumeration.
///
/// Every alias is its own option, in enumeration order. The list is rebuilt
/// only when the schema fingerprint changes.
#[derive(Default)]
pub struct BehaviourSelector {
    options: Vec<SelectorOption>,
    selected: Option<usize>,
    fingerprint: Option<Fingerprint>,
    events: Option<Subscription>,
}

impl BehaviourSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector populated from the store's schema and following its changes.
    pub fn attached(store: &PlanTreeStore) -> Self {
        let mut selector = Self {
            events: Some(store.subscribe()),
            ..Self::default()
        };
        selector.refresh(&store.get_schema(), store.schema_fingerprint());
        selector
    }

    /// Rebuilds the options; returns whether anything was rebuilt.
    ///
    /// The previous selection is kept when its label survives, otherwise
    /// the first option is selected.
    pub fn refresh(&mut self, schema: &Schema, fingerprint: &Fingerprint) -> bool {
        if self.fingerprint.as_ref() == Some(fingerprint) {
            debug!("Schema {} unchanged, keeping behaviour options", fingerprint.short());
            return false;
        }

        let previous = self.selected_option().map(|option| option.label.clone());
        self.options = schema
            .behaviour_table()
            .entries()
            .iter()
            .flat_map(|entry| {
                entry.aliases.iter().map(|alias| SelectorOption {
                    index: entry.index.clone(),
                    label: alias.clone(),
                })
            })
            .collect();
        self.selected = previous
            .and_then(|label| self.options.iter().position(|o| o.label == label))
            .or(if self.options.is_empty() { None } else { Some(0) });
        self.fingerprint = Some(fingerprint.clone());
        true
    }

    /// Selects `name` under the first enumeration index that lists it.
    ///
    /// Options follow enumeration order, so the first option carrying the
    /// label belongs to that index.
    pub fn select_by_name(&mut self, name: &str) -> Option<usize> {
        let position = self.options.iter().position(|option| option.label == name)?;
        self.selected = Some(position);
        Some(position)
    }

    /// Selects by list position; out-of-range positions are ignored.
    pub fn select(&mut self, position: usize) -> bool {
        if position < self.options.len() {
            self.selected = Some(position);
            true
        } else {
            false
        }
    }

    pub fn options(&self) -> &[SelectorOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_option(&self) -> Option<&SelectorOption> {
        self.options.get(self.selected?)
    }

    /// Applies pending schema changes from the store.
    pub fn sync(&mut self) -> bool {
        let Some(events) = self.events.as_mut() else {
            return false;
        };
        let latest = events
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                StoreEvent::SchemaChanged {
                    schema,
                    fingerprint,
                } => Some((schema, fingerprint)),
                StoreEvent::PlanTreeChanged { .. } => None,
            })
            .last();
        match latest {
            Some((schema, fingerprint)) => self.refresh(&schema, &fingerprint),
            None => false,
        }
    }
}
