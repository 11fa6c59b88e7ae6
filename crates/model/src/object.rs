//! Managed objects: tags, triggers and variables.
//!
//! Each object kind maps one-to-one onto its wire type. Content equality
//! covers every declared field except the remote id, so a freshly declared
//! object compares equal to its created counterpart when nothing else
//! differs.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use tagsync_core::{Attr, Error, Result};

use crate::condition::{ConditionNode, conditions_eq, conditions_from_wire, conditions_to_wire};
use crate::kind::ObjectKind;
use crate::parameter::{ParameterNode, parameters_eq, parameters_from_wire, parameters_to_wire};
use crate::schema::ParameterSchema;
use crate::wire::{WireObject, WireTag, WireTrigger, WireVariable};

/// A named object reconciled against its remote counterpart.
pub trait ManagedObject: Clone + Debug + Send + Sync + 'static {
    /// Wire payload exchanged with the remote API.
    type Wire: WireObject;

    /// Kind of object.
    const KIND: ObjectKind;

    /// Natural key used for reconciliation.
    fn name(&self) -> &str;

    /// Remote-assigned id.
    fn remote_id(&self) -> &Attr;

    /// Wrap a remote object. The id is always taken from the remote side.
    fn from_wire(wire: Self::Wire) -> Self;

    /// Unwrap into a payload for submission. A known id is carried only for
    /// keying; existence is always decided by name.
    fn to_wire(&self) -> Self::Wire;

    /// Equality over every field except the remote id.
    fn content_eq(&self, other: &Self) -> bool;

    /// Check declared content before anything is sent to the remote.
    ///
    /// # Errors
    ///
    /// Returns an error when the name or type is empty or a parameter tree
    /// breaks the schema.
    fn validate(&self, schema: &ParameterSchema) -> Result<()>;
}

fn require(field: &str, value: &str, name: &str) -> Result<()> {
    if value.is_empty() {
        Err(Error::missing_field(field, name))
    } else {
        Ok(())
    }
}

/// A tag: parameters plus the triggers that fire it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "id", skip_serializing_if = "Attr::is_absent")]
    pub remote_id: Attr,
    #[serde(default, skip_serializing_if = "Attr::is_absent")]
    pub notes: Attr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firing_trigger_ids: Vec<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            remote_id: Attr::Unknown,
            notes: Attr::Null,
            parameters: Vec::new(),
            firing_trigger_ids: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<Attr>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterNode) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_firing_trigger(mut self, trigger_id: impl Into<String>) -> Self {
        self.firing_trigger_ids.push(trigger_id.into());
        self
    }
}

impl ManagedObject for Tag {
    type Wire = WireTag;

    const KIND: ObjectKind = ObjectKind::Tag;

    fn name(&self) -> &str {
        &self.name
    }

    fn remote_id(&self) -> &Attr {
        &self.remote_id
    }

    fn from_wire(wire: WireTag) -> Self {
        Self {
            name: wire.name,
            kind: wire.kind,
            remote_id: Attr::from_wire(wire.tag_id),
            notes: Attr::from_wire(wire.notes),
            parameters: parameters_from_wire(wire.parameter),
            firing_trigger_ids: wire.firing_trigger_id,
        }
    }

    fn to_wire(&self) -> WireTag {
        WireTag {
            name: self.name.clone(),
            kind: self.kind.clone(),
            tag_id: self.remote_id.to_wire(),
            notes: self.notes.to_wire(),
            parameter: parameters_to_wire(&self.parameters),
            firing_trigger_id: self.firing_trigger_ids.clone(),
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.notes == other.notes
            && parameters_eq(&self.parameters, &other.parameters)
            && self.firing_trigger_ids == other.firing_trigger_ids
    }

    fn validate(&self, schema: &ParameterSchema) -> Result<()> {
        require("name", &self.name, "tag")?;
        require("type", &self.kind, &self.name)?;
        schema.validate(&format!("{}.parameters", self.name), &self.parameters)
    }
}

/// A trigger: a type plus condition filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "id", skip_serializing_if = "Attr::is_absent")]
    pub remote_id: Attr,
    #[serde(default, skip_serializing_if = "Attr::is_absent")]
    pub notes: Attr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_event_filter: Vec<ConditionNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<ConditionNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_event_filter: Vec<ConditionNode>,
}

impl Trigger {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            remote_id: Attr::Unknown,
            notes: Attr::Null,
            custom_event_filter: Vec::new(),
            filter: Vec::new(),
            auto_event_filter: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<Attr>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_custom_event_filter(mut self, condition: ConditionNode) -> Self {
        self.custom_event_filter.push(condition);
        self
    }

    #[must_use]
    pub fn with_filter(mut self, condition: ConditionNode) -> Self {
        self.filter.push(condition);
        self
    }
}

impl ManagedObject for Trigger {
    type Wire = WireTrigger;

    const KIND: ObjectKind = ObjectKind::Trigger;

    fn name(&self) -> &str {
        &self.name
    }

    fn remote_id(&self) -> &Attr {
        &self.remote_id
    }

    fn from_wire(wire: WireTrigger) -> Self {
        Self {
            name: wire.name,
            kind: wire.kind,
            remote_id: Attr::from_wire(wire.trigger_id),
            notes: Attr::from_wire(wire.notes),
            custom_event_filter: conditions_from_wire(wire.custom_event_filter),
            filter: conditions_from_wire(wire.filter),
            auto_event_filter: conditions_from_wire(wire.auto_event_filter),
        }
    }

    fn to_wire(&self) -> WireTrigger {
        WireTrigger {
            name: self.name.clone(),
            kind: self.kind.clone(),
            trigger_id: self.remote_id.to_wire(),
            notes: self.notes.to_wire(),
            custom_event_filter: conditions_to_wire(&self.custom_event_filter),
            filter: conditions_to_wire(&self.filter),
            auto_event_filter: conditions_to_wire(&self.auto_event_filter),
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.notes == other.notes
            && conditions_eq(&self.custom_event_filter, &other.custom_event_filter)
            && conditions_eq(&self.filter, &other.filter)
            && conditions_eq(&self.auto_event_filter, &other.auto_event_filter)
    }

    fn validate(&self, schema: &ParameterSchema) -> Result<()> {
        require("name", &self.name, "trigger")?;
        require("type", &self.kind, &self.name)?;
        schema.validate_conditions(
            &format!("{}.custom_event_filter", self.name),
            &self.custom_event_filter,
        )?;
        schema.validate_conditions(&format!("{}.filter", self.name), &self.filter)?;
        schema.validate_conditions(
            &format!("{}.auto_event_filter", self.name),
            &self.auto_event_filter,
        )
    }
}

/// A variable: a type plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "id", skip_serializing_if = "Attr::is_absent")]
    pub remote_id: Attr,
    #[serde(default, skip_serializing_if = "Attr::is_absent")]
    pub notes: Attr,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterNode>,
}

impl Variable {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            remote_id: Attr::Unknown,
            notes: Attr::Null,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<Attr>) -> Self {
        self.notes = notes.into();
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterNode) -> Self {
        self.parameters.push(parameter);
        self
    }
}

impl ManagedObject for Variable {
    type Wire = WireVariable;

    const KIND: ObjectKind = ObjectKind::Variable;

    fn name(&self) -> &str {
        &self.name
    }

    fn remote_id(&self) -> &Attr {
        &self.remote_id
    }

    fn from_wire(wire: WireVariable) -> Self {
        Self {
            name: wire.name,
            kind: wire.kind,
            remote_id: Attr::from_wire(wire.variable_id),
            notes: Attr::from_wire(wire.notes),
            parameters: parameters_from_wire(wire.parameter),
        }
    }

    fn to_wire(&self) -> WireVariable {
        WireVariable {
            name: self.name.clone(),
            kind: self.kind.clone(),
            variable_id: self.remote_id.to_wire(),
            notes: self.notes.to_wire(),
            parameter: parameters_to_wire(&self.parameters),
        }
    }

    fn content_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.notes == other.notes
            && parameters_eq(&self.parameters, &other.parameters)
    }

    fn validate(&self, schema: &ParameterSchema) -> Result<()> {
        require("name", &self.name, "variable")?;
        require("type", &self.kind, &self.name)?;
        schema.validate(&format!("{}.parameters", self.name), &self.parameters)
    }
}
