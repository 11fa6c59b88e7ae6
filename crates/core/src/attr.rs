//! Tri-state string attribute.
//!
//! Declared configuration distinguishes three states for an optional
//! string: not yet known (a remote id before creation), explicitly absent,
//! and present. The remote wire format only has plain strings, where the
//! empty string stands for "absent". [`Attr`] keeps the three states apart
//! on the model side and collapses them only at the wire boundary.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string attribute that is unknown, null, or a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Attr {
    /// Not known yet; filled in by the remote system later.
    Unknown,
    /// Explicitly absent.
    #[default]
    Null,
    /// A present, non-empty value.
    Value(String),
}

impl Attr {
    /// Build an attribute from a string, mapping the empty string to `Null`.
    pub fn value(s: impl Into<String>) -> Self {
        Self::from_wire(s)
    }

    /// Build an attribute from a wire string. The empty string means absent.
    pub fn from_wire(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() { Self::Null } else { Self::Value(s) }
    }

    /// Build an attribute from an optional string.
    pub fn from_option(s: Option<String>) -> Self {
        s.map_or(Self::Null, Self::from_wire)
    }

    /// Collapse to the wire representation: absent and unknown become `""`.
    pub fn to_wire(&self) -> String {
        self.as_str().unwrap_or_default().to_string()
    }

    /// Borrow the value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(s) => Some(s.as_str()),
            Self::Unknown | Self::Null => None,
        }
    }

    /// Whether the attribute carries a value.
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Whether the attribute is explicitly absent.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the attribute has no value (unknown or null).
    pub const fn is_absent(&self) -> bool {
        !self.is_known()
    }
}

impl From<&str> for Attr {
    fn from(s: &str) -> Self {
        Self::from_wire(s)
    }
}

impl From<String> for Attr {
    fn from(s: String) -> Self {
        Self::from_wire(s)
    }
}

impl From<Option<String>> for Attr {
    fn from(s: Option<String>) -> Self {
        Self::from_option(s)
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "<unknown>"),
            Self::Null => write!(f, "<null>"),
            Self::Value(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for Attr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(s) => serializer.serialize_some(s),
            Self::Unknown | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Attr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(Self::from_option)
    }
}
