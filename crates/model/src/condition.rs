//! Conditions used by trigger filters.

use serde::{Deserialize, Serialize};

use crate::parameter::{ParameterNode, parameters_eq, parameters_from_wire, parameters_to_wire};
use crate::wire::WireCondition;

/// A typed predicate over an ordered argument list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterNode>,
}

impl ConditionNode {
    /// Create a condition without arguments.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            parameters: Vec::new(),
        }
    }

    /// Append an argument.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterNode) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn to_wire(&self) -> WireCondition {
        WireCondition {
            kind: self.kind.clone(),
            parameter: parameters_to_wire(&self.parameters),
        }
    }

    pub fn from_wire(wire: WireCondition) -> Self {
        Self {
            kind: wire.kind,
            parameters: parameters_from_wire(wire.parameter),
        }
    }

    /// Same kind and every argument structurally equal, position by position.
    pub fn structural_eq(&self, other: &Self) -> bool {
        self.kind == other.kind && parameters_eq(&self.parameters, &other.parameters)
    }
}

pub fn conditions_to_wire(conditions: &[ConditionNode]) -> Vec<WireCondition> {
    conditions.iter().map(ConditionNode::to_wire).collect()
}

pub fn conditions_from_wire(conditions: Vec<WireCondition>) -> Vec<ConditionNode> {
    conditions.into_iter().map(ConditionNode::from_wire).collect()
}

/// Positional structural equality of two condition lists.
pub fn conditions_eq(a: &[ConditionNode], b: &[ConditionNode]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
}
