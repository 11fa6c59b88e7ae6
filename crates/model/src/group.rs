//! Name-keyed collections of managed objects.

use std::fmt;

use im::OrdMap;
use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tagsync_core::{Error, Result};

use crate::object::ManagedObject;

/// A set of objects of one kind, keyed by name.
///
/// Iteration is always in name order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceGroup<O: ManagedObject> {
    objects: OrdMap<String, O>,
}

impl<O: ManagedObject> ResourceGroup<O> {
    pub fn new() -> Self {
        Self {
            objects: OrdMap::new(),
        }
    }

    /// Build a group, rejecting two objects with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateName`] on the first repeated name.
    pub fn from_objects(objects: impl IntoIterator<Item = O>) -> Result<Self> {
        objects.into_iter().try_fold(Self::new(), |mut group, object| {
            if group.contains(object.name()) {
                return Err(Error::duplicate_name(O::KIND.as_str(), object.name()));
            }
            group.insert(object);
            Ok(group)
        })
    }

    /// Insert under the object's own name, returning any object it replaced.
    pub fn insert(&mut self, object: O) -> Option<O> {
        self.objects.insert(object.name().to_string(), object)
    }

    pub fn remove(&mut self, name: &str) -> Option<O> {
        self.objects.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&O> {
        self.objects.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &O)> {
        self.objects.iter().map(|(name, object)| (name.as_str(), object))
    }

    pub fn values(&self) -> impl Iterator<Item = &O> {
        self.objects.values()
    }

    /// Same names, and every pair equal by [`ManagedObject::content_eq`].
    pub fn content_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, object)| other.get(name).is_some_and(|o| object.content_eq(o)))
    }
}

impl<O: ManagedObject> Default for ResourceGroup<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: ManagedObject> fmt::Display for ResourceGroup<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s [{}]", O::KIND, self.names().join(", "))
    }
}

impl<O: ManagedObject> FromIterator<O> for ResourceGroup<O> {
    /// Collect, letting later objects replace earlier ones with the same name.
    fn from_iter<I: IntoIterator<Item = O>>(iter: I) -> Self {
        let mut group = Self::new();
        for object in iter {
            group.insert(object);
        }
        group
    }
}

impl<O: ManagedObject + Serialize> Serialize for ResourceGroup<O> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.values())
    }
}

impl<'de, O: ManagedObject + DeserializeOwned> Deserialize<'de> for ResourceGroup<O> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let objects = Vec::<O>::deserialize(deserializer)?;
        Self::from_objects(objects).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::object::{Tag, Variable};

    #[test]
    fn test_iterates_in_name_order() {
        let group: ResourceGroup<Tag> = [Tag::new("b", "html"), Tag::new("a", "html")]
            .into_iter()
            .collect();
        assert_eq!(group.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(group.to_string(), "tags [a, b]");
    }

    #[test]
    fn test_from_objects_rejects_duplicates() {
        let result =
            ResourceGroup::from_objects([Variable::new("x", "c"), Variable::new("x", "jsm")]);
        assert!(matches!(
            result,
            Err(Error::DuplicateName { ref kind, ref name }) if kind == "variable" && name == "x"
        ));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut group = ResourceGroup::new();
        assert!(group.insert(Tag::new("a", "html")).is_none());
        assert!(group.insert(Tag::new("a", "img")).is_some());
        assert_eq!(group.len(), 1);
        assert_eq!(group.get("a").unwrap().kind, "img");
        assert!(group.remove("a").is_some());
        assert!(group.is_empty());
    }

    #[test]
    fn test_content_eq_ignores_ids() {
        let declared = ResourceGroup::from_objects([Tag::new("a", "html")]).unwrap();
        let mut created = Tag::new("a", "html");
        created.remote_id = tagsync_core::Attr::value("5");
        let state = ResourceGroup::from_objects([created]).unwrap();
        assert!(declared.content_eq(&state));
        assert!(!declared.content_eq(&ResourceGroup::new()));
    }

    #[test]
    fn test_serde_as_sequence() {
        let json = r#"[{"name":"b","type":"html"},{"name":"a","type":"img"}]"#;
        let group: ResourceGroup<Tag> = serde_json::from_str(json).unwrap();
        assert_eq!(group.len(), 2);
        let out = serde_json::to_value(&group).unwrap();
        assert_eq!(out[0]["name"], "a");

        let dup = r#"[{"name":"a","type":"html"},{"name":"a","type":"img"}]"#;
        assert!(serde_json::from_str::<ResourceGroup<Tag>>(dup).is_err());
    }
}
