//! # tagsync
//!
//! Declarative management of tag-manager tags, triggers and variables.
//!
//! The binary loads a manifest and the tracked state, runs a
//! [`GroupReconciler`](tagsync_reconciler::GroupReconciler) per object kind
//! and persists whatever state the pass produced.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cli;
pub mod commands;
pub mod inventory;

pub use cli::{Cli, Commands};
pub use commands::{Remotes, Tally, execute, load_config};
pub use inventory::{Grouped, Inventory};
