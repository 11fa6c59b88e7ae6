//! Validation rules for declared parameter trees.
//!
//! The schema is built once (usually [`ParameterSchema::standard`]) and
//! shared read-only, typically behind an `Arc`, by every reconciler.

use tagsync_core::{Error, Result};

use crate::condition::ConditionNode;
use crate::parameter::{LIST_KIND, MAP_KIND, ParameterBody, ParameterNode};

/// Deepest parameter nesting accepted, counting top-level parameters as 1.
///
/// Observed limit of the remote schema; not confirmed by its documentation.
pub const MAX_PARAMETER_DEPTH: usize = 5;

/// Structural rules a declared parameter tree must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSchema {
    max_depth: usize,
}

impl ParameterSchema {
    /// The schema the remote API accepts.
    pub const fn standard() -> Self {
        Self::with_max_depth(MAX_PARAMETER_DEPTH)
    }

    pub const fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Validate a top-level parameter list found at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DepthExceeded`] when a node is nested too deep,
    /// [`Error::MissingField`] when a node has no type or a map entry has
    /// no key, and [`Error::InvalidRecord`] when a node's type does not
    /// match its body.
    pub fn validate(&self, path: &str, parameters: &[ParameterNode]) -> Result<()> {
        parameters
            .iter()
            .enumerate()
            .try_for_each(|(i, node)| self.validate_node(&format!("{path}[{i}]"), node, 1))
    }

    /// Validate a condition list found at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingField`] for a condition without a type, or any
    /// error of [`ParameterSchema::validate`] for its arguments.
    pub fn validate_conditions(&self, path: &str, conditions: &[ConditionNode]) -> Result<()> {
        conditions.iter().enumerate().try_for_each(|(i, condition)| {
            let at = format!("{path}[{i}]");
            if condition.kind.is_empty() {
                return Err(Error::missing_field("type", at));
            }
            self.validate(&format!("{at}.parameters"), &condition.parameters)
        })
    }

    fn validate_node(&self, path: &str, node: &ParameterNode, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::depth_exceeded(path, depth, self.max_depth));
        }
        if node.kind().is_empty() {
            return Err(Error::missing_field("type", path));
        }
        let container = match node.body() {
            ParameterBody::Scalar(_) => None,
            ParameterBody::List(_) => Some(LIST_KIND),
            ParameterBody::Map(_) => Some(MAP_KIND),
        };
        let kind = node.kind();
        if container.is_some_and(|expected| expected != kind)
            || (container.is_none() && (kind == LIST_KIND || kind == MAP_KIND))
        {
            return Err(Error::invalid_record(format!(
                "{path}: parameter of type '{kind}' must hold '{kind}' children"
            )));
        }
        match node.body() {
            ParameterBody::Scalar(_) => Ok(()),
            ParameterBody::List(children) => {
                children.iter().enumerate().try_for_each(|(i, child)| {
                    let at = format!("{path}.list[{i}]");
                    self.validate_node(&at, child, depth.saturating_add(1))
                })
            }
            ParameterBody::Map(entries) => {
                entries.iter().enumerate().try_for_each(|(i, entry)| {
                    let at = format!("{path}.map[{i}]");
                    if entry.key().is_absent() {
                        return Err(Error::missing_field("key", at));
                    }
                    self.validate_node(&at, entry, depth.saturating_add(1))
                })
            }
        }
    }
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::standard()
    }
}
