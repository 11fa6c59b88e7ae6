//! Object kinds managed inside a workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A category of remote configuration entity with its own endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Tag,
    Trigger,
    Variable,
}

impl ObjectKind {
    /// All kinds, in the order a full apply walks them.
    pub const ALL: [Self; 3] = [Self::Trigger, Self::Variable, Self::Tag];

    /// Singular lowercase name, e.g. `"tag"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Trigger => "trigger",
            Self::Variable => "variable",
        }
    }

    /// Path segment of the collection endpoint, e.g. `"tags"`.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Trigger => "triggers",
            Self::Variable => "variables",
        }
    }

    /// Field holding the items in a list response, e.g. `"tag"`.
    pub const fn list_field(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
