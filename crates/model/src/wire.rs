//! Wire representation exchanged with the tag-manager API.
//!
//! Every optional string is a plain `String` where `""` means absent, and
//! empty collections are omitted on the way out.

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kind::ObjectKind;

/// A remote object that can be created, listed, fetched, updated and deleted.
pub trait WireObject:
    Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind of object, selecting the endpoint.
    const KIND: ObjectKind;

    /// Natural key of the object.
    fn name(&self) -> &str;

    /// Remote-assigned id, `""` before creation.
    fn id(&self) -> &str;

    /// Set the remote-assigned id.
    fn set_id(&mut self, id: String);

    fn set_name(&mut self, name: String);
}

/// A parameter on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireParameter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<WireParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub map: Vec<WireParameter>,
}

/// A condition on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCondition {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<WireParameter>,
}

/// A tag on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTag {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tag_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<WireParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub firing_trigger_id: Vec<String>,
}

impl WireObject for WireTag {
    const KIND: ObjectKind = ObjectKind::Tag;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.tag_id
    }

    fn set_id(&mut self, id: String) {
        self.tag_id = id;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// A trigger on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTrigger {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trigger_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_event_filter: Vec<WireCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<WireCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auto_event_filter: Vec<WireCondition>,
}

impl WireObject for WireTrigger {
    const KIND: ObjectKind = ObjectKind::Trigger;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.trigger_id
    }

    fn set_id(&mut self, id: String) {
        self.trigger_id = id;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// A variable on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVariable {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub variable_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<WireParameter>,
}

impl WireObject for WireVariable {
    const KIND: ObjectKind = ObjectKind::Variable;

    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &str {
        &self.variable_id
    }

    fn set_id(&mut self, id: String) {
        self.variable_id = id;
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

/// A workspace on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireWorkspace {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub workspace_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}
