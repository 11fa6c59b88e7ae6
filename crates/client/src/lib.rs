#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # tagsync-client
//!
//! Remote side of tagsync: the [`RemoteResource`] seam the reconcilers call,
//! an HTTP implementation for the tag-manager API, and a deterministic
//! in-memory implementation.
//!
//! ## Features
//!
//! - Workspace resolution by name, creating the workspace when missing
//! - CRUD for tags, triggers and variables with paginated listing
//! - Process-wide request pacing from a queries-per-minute limit
//! - In-memory remote with a call log and failure injection
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagsync_client::{ClientConfig, GtmClient, WorkspaceScope};
//! use tagsync_model::WireTag;
//!
//! let client = Arc::new(GtmClient::new(ClientConfig::from_env())?);
//! let scope = WorkspaceScope::resolve(&client, "tagsync").await?;
//! let tags = scope.resource::<WireTag>(client.clone());
//! let existing = tags.list().await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod pacer;
pub mod resource;
pub mod workspace;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use http::GtmClient;
pub use memory::{InMemoryResource, Operation, RemoteCall};
pub use pacer::Pacer;
pub use resource::RemoteResource;
pub use workspace::{ResourceClient, WorkspaceScope};
