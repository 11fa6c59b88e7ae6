//! Convergence of declared tag-manager objects against the remote.
//!
//! This crate implements a one-pass reconciliation pattern:
//!
//! - **Desired set**: the objects the user declared, keyed by name
//! - **Tracked set**: the last known remote form of those objects, with ids
//! - **Diff**: deletions, then creations, then updates of changed content
//! - **Outcome**: the new tracked set, the mutations performed, and the
//!   failures, with every phase stopping on its own first failure
//!
//! # Key Concepts
//!
//! ## Phases
//!
//! A failure stops only the phase it occurs in, so one stuck deletion does
//! not block creations or updates. The returned state always matches the
//! calls that succeeded and is safe to persist as is.
//!
//! ## Cancellation
//!
//! A [`CancellationToken`](tokio_util::sync::CancellationToken) is checked
//! before each remote call. In-flight calls complete; nothing after them is
//! started.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagsync_client::InMemoryResource;
//! use tagsync_model::{ParameterSchema, ResourceGroup, Tag, WireTag};
//! use tagsync_reconciler::GroupReconciler;
//!
//! #[tokio::main]
//! async fn main() {
//!     let remote = Arc::new(InMemoryResource::<WireTag>::new());
//!     let reconciler = GroupReconciler::<Tag>::builder()
//!         .with_remote(remote)
//!         .with_schema(Arc::new(ParameterSchema::standard()))
//!         .build()
//!         .unwrap();
//!
//!     let desired = ResourceGroup::from_objects([Tag::new("Pageview", "html")]).unwrap();
//!     let outcome = reconciler.update(&desired, &ResourceGroup::new()).await;
//!     assert!(outcome.all_succeeded());
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod group;
pub mod single;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use group::{GroupReconciler, ReconcilerBuilder};
pub use single::ObjectReconciler;
pub use types::{GroupOutcome, Phase, ReconcileAction, diff};
