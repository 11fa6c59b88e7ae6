//! Recursive parameter tree.
//!
//! A parameter is a typed value: a scalar, an ordered list of parameters, or
//! a map. Maps are kept as an ordered list of keyed entries because that is
//! the shape the remote API accepts; duplicate keys are carried through
//! untouched.
//!
//! The `kind` tag is opaque to this layer except for the two container
//! kinds, [`LIST_KIND`] and [`MAP_KIND`], which select the body variant.

use serde::{Deserialize, Serialize};
use tagsync_core::{Attr, Error};

use crate::wire::WireParameter;

/// Kind tag of list parameters.
pub const LIST_KIND: &str = "list";

/// Kind tag of map parameters.
pub const MAP_KIND: &str = "map";

/// Body of a parameter, selected by its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterBody {
    /// Any non-container kind.
    Scalar(Attr),
    /// Ordered children.
    List(Vec<ParameterNode>),
    /// Ordered keyed entries.
    Map(Vec<ParameterNode>),
}

/// One node of a parameter tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ParameterRepr", into = "ParameterRepr")]
pub struct ParameterNode {
    key: Attr,
    kind: String,
    body: ParameterBody,
}

impl ParameterNode {
    /// Create a scalar parameter.
    pub fn scalar(kind: impl Into<String>, value: impl Into<Attr>) -> Self {
        Self {
            key: Attr::Null,
            kind: kind.into(),
            body: ParameterBody::Scalar(value.into()),
        }
    }

    /// Create a list parameter.
    pub fn list(children: Vec<Self>) -> Self {
        Self {
            key: Attr::Null,
            kind: LIST_KIND.to_string(),
            body: ParameterBody::List(children),
        }
    }

    /// Create a map parameter from keyed entries.
    pub fn map(entries: Vec<Self>) -> Self {
        Self {
            key: Attr::Null,
            kind: MAP_KIND.to_string(),
            body: ParameterBody::Map(entries),
        }
    }

    /// Set the key under which this node sits in its parent map.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Attr>) -> Self {
        self.key = key.into();
        self
    }

    pub const fn key(&self) -> &Attr {
        &self.key
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub const fn body(&self) -> &ParameterBody {
        &self.body
    }

    /// Scalar value, or `None` for container kinds.
    pub const fn value(&self) -> Option<&Attr> {
        match &self.body {
            ParameterBody::Scalar(value) => Some(value),
            ParameterBody::List(_) | ParameterBody::Map(_) => None,
        }
    }

    /// Children of a list or map; empty for scalars.
    pub fn children(&self) -> &[Self] {
        match &self.body {
            ParameterBody::Scalar(_) => &[],
            ParameterBody::List(children) | ParameterBody::Map(children) => children,
        }
    }

    /// Nesting depth, counting this node as 1.
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(Self::depth)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Convert to the wire representation.
    pub fn to_wire(&self) -> WireParameter {
        let mut wire = WireParameter {
            key: self.key.to_wire(),
            kind: self.kind.clone(),
            ..WireParameter::default()
        };
        match &self.body {
            ParameterBody::Scalar(value) => wire.value = value.to_wire(),
            ParameterBody::List(children) => wire.list = parameters_to_wire(children),
            ParameterBody::Map(entries) => wire.map = parameters_to_wire(entries),
        }
        wire
    }

    /// Convert from the wire representation. Empty strings become `Null`.
    pub fn from_wire(wire: WireParameter) -> Self {
        let body = match wire.kind.as_str() {
            LIST_KIND => ParameterBody::List(parameters_from_wire(wire.list)),
            MAP_KIND => ParameterBody::Map(parameters_from_wire(wire.map)),
            _ => ParameterBody::Scalar(Attr::from_wire(wire.value)),
        };
        Self {
            key: Attr::from_wire(wire.key),
            kind: wire.kind,
            body,
        }
    }

    /// Structural equality: key, kind, scalar value, then children in order.
    pub fn structural_eq(&self, other: &Self) -> bool {
        if self.key != other.key || self.kind != other.kind {
            return false;
        }
        match (&self.body, &other.body) {
            (ParameterBody::Scalar(a), ParameterBody::Scalar(b)) => a == b,
            (ParameterBody::List(a), ParameterBody::List(b))
            | (ParameterBody::Map(a), ParameterBody::Map(b)) => parameters_eq(a, b),
            _ => false,
        }
    }
}

/// Convert a parameter list to the wire representation.
pub fn parameters_to_wire(parameters: &[ParameterNode]) -> Vec<WireParameter> {
    parameters.iter().map(ParameterNode::to_wire).collect()
}

/// Convert a wire parameter list into parameter nodes.
pub fn parameters_from_wire(parameters: Vec<WireParameter>) -> Vec<ParameterNode> {
    parameters.into_iter().map(ParameterNode::from_wire).collect()
}

/// Positional structural equality of two parameter lists.
pub fn parameters_eq(a: &[ParameterNode], b: &[ParameterNode]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
}

/// Declared shape of a parameter: `{ key, type, value, list, map }`.
#[derive(Serialize, Deserialize)]
struct ParameterRepr {
    #[serde(default, skip_serializing_if = "Attr::is_absent")]
    key: Attr,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Attr::is_absent")]
    value: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    list: Option<Vec<ParameterNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    map: Option<Vec<ParameterNode>>,
}

impl TryFrom<ParameterRepr> for ParameterNode {
    type Error = Error;

    fn try_from(repr: ParameterRepr) -> Result<Self, Self::Error> {
        let body = match repr.kind.as_str() {
            LIST_KIND if repr.value.is_absent() && repr.map.is_none() => {
                ParameterBody::List(repr.list.unwrap_or_default())
            }
            MAP_KIND if repr.value.is_absent() && repr.list.is_none() => {
                ParameterBody::Map(repr.map.unwrap_or_default())
            }
            LIST_KIND | MAP_KIND => {
                return Err(Error::invalid_record(format!(
                    "parameter of type '{}' only accepts '{}' children",
                    repr.kind, repr.kind
                )));
            }
            _ if repr.list.is_some() || repr.map.is_some() => {
                return Err(Error::invalid_record(format!(
                    "parameter of type '{}' cannot have list or map children",
                    repr.kind
                )));
            }
            _ => ParameterBody::Scalar(repr.value),
        };
        Ok(Self {
            key: repr.key,
            kind: repr.kind,
            body,
        })
    }
}

impl From<ParameterNode> for ParameterRepr {
    fn from(node: ParameterNode) -> Self {
        let (value, list, map) = match node.body {
            ParameterBody::Scalar(value) => (value, None, None),
            ParameterBody::List(children) => (Attr::Null, Some(children), None),
            ParameterBody::Map(entries) => (Attr::Null, None, Some(entries)),
        };
        Self {
            key: node.key,
            kind: node.kind,
            value,
            list,
            map,
        }
    }
}
