//! Schema model: enumerations of valid behaviour and predicate names.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Top-level key holding the behaviour enumeration.
pub const BEHAVIOUR_ENUM: &str = "BehaviourEnum";
/// Top-level key holding the predicate enumeration.
pub const PREDICATE_ENUM: &str = "PredicateEnum";
/// Key of the alias table inside an enumeration.
pub const ENUM_TABLE: &str = "ENUM";

/// Enumerations of the names a plan tree may refer to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Schema {
    #[serde(rename = "BehaviourEnum")]
    pub behaviours: Enumeration,

    #[serde(rename = "PredicateEnum")]
    pub predicates: Enumeration,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    /// Builds a schema from behaviour and predicate tables.
    pub fn new(behaviours: EnumTable, predicates: EnumTable) -> Self {
        Self {
            behaviours: Enumeration::from(behaviours),
            predicates: Enumeration::from(predicates),
            extra: Map::new(),
        }
    }

    pub fn behaviour_table(&self) -> &EnumTable {
        &self.behaviours.entries
    }

    pub fn predicate_table(&self) -> &EnumTable {
        &self.predicates.entries
    }
}

/// One enumeration of a schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Enumeration {
    #[serde(rename = "ENUM", default)]
    pub entries: EnumTable,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<EnumTable> for Enumeration {
    fn from(entries: EnumTable) -> Self {
        Self {
            entries,
            extra: Map::new(),
        }
    }
}

/// An enumerated value: a stable index and every alias it is known by.
///
/// Several aliases on one index let a value be renamed while keeping its
/// identity across saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub index: String,
    pub aliases: Vec<String>,
}

impl EnumEntry {
    pub fn new<I, S>(index: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index: index.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == name)
    }
}

/// Ordered index → aliases table, serialized as a JSON object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumTable(Vec<EnumEntry>);

impl EnumTable {
    pub fn entries(&self) -> &[EnumEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First entry whose alias set contains `name`.
    pub fn find_alias(&self, name: &str) -> Option<&EnumEntry> {
        self.0.iter().find(|entry| entry.has_alias(name))
    }

    pub fn contains_alias(&self, name: &str) -> bool {
        self.find_alias(name).is_some()
    }

    /// Every alias in table order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|entry| entry.aliases.iter().map(String::as_str))
    }
}

impl FromIterator<EnumEntry> for EnumTable {
    fn from_iter<T: IntoIterator<Item = EnumEntry>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for EnumTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.index, &entry.aliases)?;
        }
        map.end()
    }
}

/// Alias list as written in a document; a bare string is one alias.
#[derive(Deserialize)]
#[serde(untagged)]
enum Aliases {
    One(String),
    Many(Vec<String>),
}

impl From<Aliases> for Vec<String> {
    fn from(aliases: Aliases) -> Self {
        match aliases {
            Aliases::One(alias) => vec![alias],
            Aliases::Many(aliases) => aliases,
        }
    }
}

struct EnumTableVisitor;

impl<'de> Visitor<'de> for EnumTableVisitor {
    type Value = EnumTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping indices to alias lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<EnumTable, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((index, aliases)) = access.next_entry::<String, Aliases>()? {
            entries.push(EnumEntry {
                index,
                aliases: aliases.into(),
            });
        }
        Ok(EnumTable(entries))
    }
}

impl<'de> Deserialize<'de> for EnumTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(EnumTableVisitor)
    }
}

/// Stable content hash of a schema.
///
/// Selectors compare fingerprints to skip rebuilding their option lists when
/// the schema did not change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex SHA-256 of the schema's serialized form.
    pub fn of(schema: &Schema) -> Result<Self> {
        let bytes = serde_json::to_vec(schema)?;
        Ok(Self(hex::encode(Sha256::digest(&bytes))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}
