//! Core types for the reconciler.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tagsync_model::{ManagedObject, ObjectKind, ResourceGroup};

use crate::error::Error;

/// A step of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Read,
    Delete,
    Create,
    Update,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// A remote mutation, planned or performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ReconcileAction {
    /// Create an object that exists only in the desired set.
    Create { name: String },
    /// Replace an object whose content differs.
    Update { name: String, id: String },
    /// Delete an object that is no longer desired.
    Delete { name: String, id: String },
}

impl ReconcileAction {
    /// Name of the object this action targets.
    pub fn name(&self) -> &str {
        match self {
            Self::Create { name } | Self::Update { name, .. } | Self::Delete { name, .. } => name,
        }
    }

    pub const fn phase(&self) -> Phase {
        match self {
            Self::Create { .. } => Phase::Create,
            Self::Update { .. } => Phase::Update,
            Self::Delete { .. } => Phase::Delete,
        }
    }

    /// Get a description of the action.
    pub fn description(&self, kind: ObjectKind) -> String {
        match self {
            Self::Create { name } => format!("create {kind} '{name}'"),
            Self::Update { name, id } => format!("update {kind} '{name}' ({id})"),
            Self::Delete { name, id } => format!("delete {kind} '{name}' ({id})"),
        }
    }
}

/// Result of one pass over a group, with partial success.
///
/// `state` is always the state to persist, whatever else happened.
#[derive(Debug)]
pub struct GroupOutcome<O: ManagedObject> {
    /// New tracked state.
    pub state: ResourceGroup<O>,
    /// Mutations that succeeded, in the order they were performed.
    pub actions: Vec<ReconcileAction>,
    /// Phase-scoped failures.
    pub errors: Vec<Error>,
}

impl<O: ManagedObject> GroupOutcome<O> {
    pub fn new(state: ResourceGroup<O>) -> Self {
        Self {
            state,
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// An outcome that left `state` untouched because of `error`.
    pub fn failed(state: ResourceGroup<O>, error: Error) -> Self {
        Self {
            state,
            actions: Vec::new(),
            errors: vec![error],
        }
    }

    /// Check if every step succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    /// Succeeded without changing anything remote.
    pub fn converged(&self) -> bool {
        self.all_succeeded() && self.actions.is_empty()
    }

    pub const fn kind(&self) -> ObjectKind {
        O::KIND
    }
}

/// Actions that bring `tracked` to `desired`: deletes, then creates, then
/// updates of entries whose content differs, each in name order.
pub fn diff<O: ManagedObject>(
    desired: &ResourceGroup<O>,
    tracked: &ResourceGroup<O>,
) -> Vec<ReconcileAction> {
    let deletes = tracked
        .iter()
        .filter(|(name, _)| !desired.contains(name))
        .map(|(name, object)| ReconcileAction::Delete {
            name: name.to_string(),
            id: object.remote_id().to_wire(),
        });

    let creates = desired
        .names()
        .filter(|name| !tracked.contains(name))
        .map(|name| ReconcileAction::Create {
            name: name.to_string(),
        });

    let updates = desired.iter().filter_map(|(name, want)| {
        tracked
            .get(name)
            .filter(|have| !want.content_eq(have))
            .map(|have| ReconcileAction::Update {
                name: name.to_string(),
                id: have.remote_id().to_wire(),
            })
    });

    deletes.chain(creates).chain(updates).collect_vec()
}

/// Names split by the phase that handles them.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct PhaseKeys {
    pub delete: Vec<String>,
    pub create: Vec<String>,
    pub update: Vec<String>,
}

impl PhaseKeys {
    pub(crate) fn split<O: ManagedObject>(
        desired: &ResourceGroup<O>,
        tracked: &ResourceGroup<O>,
    ) -> Self {
        let (update, create): (Vec<String>, Vec<String>) = desired
            .names()
            .map(str::to_string)
            .partition(|name| tracked.contains(name));
        let delete = tracked
            .names()
            .filter(|name| !desired.contains(name))
            .map(str::to_string)
            .collect_vec();
        Self {
            delete,
            create,
            update,
        }
    }
}
