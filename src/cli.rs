//! CLI command definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// tagsync - declarative tag-manager configuration
#[derive(Parser, Debug)]
#[command(name = "tagsync")]
#[command(version)]
#[command(about = "Converge tag-manager tags, triggers and variables against a manifest")]
#[command(
    long_about = "tagsync compares a declared manifest with the last known remote state and issues the create, update and delete calls that bring the workspace in line, recording the result in a state file."
)]
pub struct Cli {
    /// Client configuration file (TOML, or JSON by extension)
    #[arg(short, long, global = true, env = "TAGSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tracked state file
    #[arg(short, long, global = true, default_value = "tagsync.state.json")]
    pub state: PathBuf,

    /// Reconcile against an in-memory remote seeded from the state file
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the changes apply would make
    Plan {
        /// Manifest file (YAML, JSON or TOML)
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Converge the workspace to the manifest
    Apply {
        /// Manifest file (YAML, JSON or TOML)
        #[arg(short, long)]
        manifest: PathBuf,
    },

    /// Refresh tracked state from the remote
    Refresh,

    /// Delete every tracked object
    Destroy,
}
