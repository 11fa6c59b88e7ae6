//! Error types for the reconciler crate.

use std::fmt;

use tagsync_model::ObjectKind;

use crate::types::Phase;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
///
/// Every variant that concerns an object names its kind, and the object
/// itself where one is involved, so a diagnostic points at a single entry.
#[derive(Debug)]
pub enum Error {
    /// Desired content failed validation; nothing was sent.
    Validation {
        kind: ObjectKind,
        source: tagsync_core::Error,
    },
    /// A remote call for one object failed.
    Remote {
        kind: ObjectKind,
        phase: Phase,
        name: String,
        source: tagsync_client::Error,
    },
    /// Listing the remote objects failed.
    ListFailed {
        kind: ObjectKind,
        source: tagsync_client::Error,
    },
    /// A tracked object has no remote id to address it by.
    MissingId {
        kind: ObjectKind,
        phase: Phase,
        name: String,
    },
    /// The pass was cancelled before this phase finished.
    Cancelled { kind: ObjectKind, phase: Phase },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { kind, source } => {
                write!(f, "invalid {kind}: {source}")
            }
            Self::Remote {
                kind,
                phase,
                name,
                source,
            } => {
                write!(f, "{phase} of {kind} '{name}' failed: {source}")
            }
            Self::ListFailed { kind, source } => {
                write!(f, "listing {kind}s failed: {source}")
            }
            Self::MissingId { kind, phase, name } => {
                write!(f, "cannot {phase} {kind} '{name}': no remote id")
            }
            Self::Cancelled { kind, phase } => {
                write!(f, "{kind} {phase} cancelled")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation { source, .. } => Some(source),
            Self::Remote { source, .. } | Self::ListFailed { source, .. } => Some(source),
            Self::MissingId { .. } | Self::Cancelled { .. } | Self::InvalidConfig { .. } => None,
        }
    }
}

impl Error {
    pub const fn validation(kind: ObjectKind, source: tagsync_core::Error) -> Self {
        Self::Validation { kind, source }
    }

    pub fn remote(
        kind: ObjectKind,
        phase: Phase,
        name: impl Into<String>,
        source: tagsync_client::Error,
    ) -> Self {
        Self::Remote {
            kind,
            phase,
            name: name.into(),
            source,
        }
    }

    pub const fn list_failed(kind: ObjectKind, source: tagsync_client::Error) -> Self {
        Self::ListFailed { kind, source }
    }

    pub fn missing_id(kind: ObjectKind, phase: Phase, name: impl Into<String>) -> Self {
        Self::MissingId {
            kind,
            phase,
            name: name.into(),
        }
    }

    pub const fn cancelled(kind: ObjectKind, phase: Phase) -> Self {
        Self::Cancelled { kind, phase }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether this is a cancellation rather than a failure.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The object kind this error concerns, if any.
    pub const fn kind(&self) -> Option<ObjectKind> {
        match self {
            Self::Validation { kind, .. }
            | Self::Remote { kind, .. }
            | Self::ListFailed { kind, .. }
            | Self::MissingId { kind, .. }
            | Self::Cancelled { kind, .. } => Some(*kind),
            Self::InvalidConfig { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_names_object() {
        let err = Error::remote(
            ObjectKind::Tag,
            Phase::Delete,
            "GA4 Config",
            tagsync_client::Error::status(500, "boom"),
        );
        let message = err.to_string();
        assert!(message.contains("delete"));
        assert!(message.contains("tag 'GA4 Config'"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_cancelled() {
        let err = Error::cancelled(ObjectKind::Trigger, Phase::Create);
        assert!(err.is_cancelled());
        assert_eq!(err.kind(), Some(ObjectKind::Trigger));
        assert_eq!(err.to_string(), "trigger create cancelled");
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation(
            ObjectKind::Variable,
            tagsync_core::Error::missing_field("type", "Page Title"),
        );
        assert!(err.to_string().starts_with("invalid variable:"));
        assert!(Error::invalid_config("no remote").kind().is_none());
    }
}
