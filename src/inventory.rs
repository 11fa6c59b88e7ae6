//! Manifest and state files.
//!
//! Both hold one group per object kind under `tags`, `triggers` and
//! `variables`. The order the groups appear in is kept so commands can
//! process them as declared.

use std::fmt;
use std::path::Path;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tagsync_core::{Error, Result};
use tagsync_model::{ManagedObject, ObjectKind, ResourceGroup, Tag, Trigger, Variable};

/// Every managed group, plus the order they were declared in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    pub tags: ResourceGroup<Tag>,
    pub triggers: ResourceGroup<Trigger>,
    pub variables: ResourceGroup<Variable>,
    order: Vec<ObjectKind>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds in declaration order, then any undeclared ones.
    pub fn kinds(&self) -> Vec<ObjectKind> {
        let mut kinds = self.order.clone();
        kinds.extend(ObjectKind::ALL.iter().filter(|k| !self.order.contains(k)));
        kinds
    }

    /// Kinds that appeared in the file, in order.
    pub fn declared(&self) -> &[ObjectKind] {
        &self.order
    }

    /// Declare `kind` next, unless already declared.
    pub fn declare(&mut self, kind: ObjectKind) {
        if !self.order.contains(&kind) {
            self.order.push(kind);
        }
    }

    pub fn group<O: Grouped>(&self) -> &ResourceGroup<O> {
        O::group(self)
    }

    pub fn group_mut<O: Grouped>(&mut self) -> &mut ResourceGroup<O> {
        O::group_mut(self)
    }

    /// Total number of objects across groups.
    pub fn len(&self) -> usize {
        [self.tags.len(), self.triggers.len(), self.variables.len()]
            .into_iter()
            .fold(0, usize::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load from YAML, JSON or TOML, chosen by file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown
    /// extension, or does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_read_failed(path, e.to_string()))?;

        match extension.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&content).map_err(|e| Error::yaml_parse_failed(e.to_string()))
            }
            "json" => {
                serde_json::from_str(&content).map_err(|e| Error::json_parse_failed(e.to_string()))
            }
            "toml" => toml::from_str(&content).map_err(|e| Error::toml_parse_failed(e.to_string())),
            other => Err(Error::unsupported_format(path, other)),
        }
    }

    /// Load tracked state; a missing file means nothing is tracked yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_state(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::new())
        }
    }

    /// Write as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileWriteFailed`] if serialization or the write
    /// fails.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::file_write_failed(path, e.to_string()))?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| Error::file_write_failed(path, e.to_string()))
    }
}

/// Object kinds that have a group in an [`Inventory`].
pub trait Grouped: ManagedObject {
    fn group(inventory: &Inventory) -> &ResourceGroup<Self>;
    fn group_mut(inventory: &mut Inventory) -> &mut ResourceGroup<Self>;
}

impl Grouped for Tag {
    fn group(inventory: &Inventory) -> &ResourceGroup<Self> {
        &inventory.tags
    }

    fn group_mut(inventory: &mut Inventory) -> &mut ResourceGroup<Self> {
        &mut inventory.tags
    }
}

impl Grouped for Trigger {
    fn group(inventory: &Inventory) -> &ResourceGroup<Self> {
        &inventory.triggers
    }

    fn group_mut(inventory: &mut Inventory) -> &mut ResourceGroup<Self> {
        &mut inventory.triggers
    }
}

impl Grouped for Variable {
    fn group(inventory: &Inventory) -> &ResourceGroup<Self> {
        &inventory.variables
    }

    fn group_mut(inventory: &mut Inventory) -> &mut ResourceGroup<Self> {
        &mut inventory.variables
    }
}

impl Serialize for Inventory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let kinds = self.kinds();
        let mut map = serializer.serialize_map(Some(kinds.len()))?;
        for kind in kinds {
            match kind {
                ObjectKind::Tag => map.serialize_entry(kind.collection(), &self.tags)?,
                ObjectKind::Trigger => map.serialize_entry(kind.collection(), &self.triggers)?,
                ObjectKind::Variable => map.serialize_entry(kind.collection(), &self.variables)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Inventory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(InventoryVisitor)
    }
}

struct InventoryVisitor;

const FIELDS: &[&str] = &["tags", "triggers", "variables"];

impl<'de> Visitor<'de> for InventoryVisitor {
    type Value = Inventory;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of tags, triggers and variables")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Inventory, A::Error> {
        let mut inventory = Inventory::new();
        while let Some(key) = map.next_key::<String>()? {
            let kind = ObjectKind::ALL
                .into_iter()
                .find(|kind| kind.collection() == key)
                .ok_or_else(|| de::Error::unknown_field(&key, FIELDS))?;
            if inventory.order.contains(&kind) {
                return Err(de::Error::duplicate_field(kind.collection()));
            }
            match kind {
                ObjectKind::Tag => inventory.tags = map.next_value()?,
                ObjectKind::Trigger => inventory.triggers = map.next_value()?,
                ObjectKind::Variable => inventory.variables = map.next_value()?,
            }
            inventory.declare(kind);
        }
        Ok(inventory)
    }
}
