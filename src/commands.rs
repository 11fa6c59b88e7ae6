//! CLI command handlers.
//!
//! Every command loads the tracked state, runs one reconciler pass per
//! group and writes the resulting state back, even when some groups
//! failed. Failures are printed and reflected in the exit code.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use tagsync_client::{ClientConfig, GtmClient, InMemoryResource, RemoteResource, WorkspaceScope};
use tagsync_model::{
    ManagedObject, ObjectKind, ParameterSchema, ResourceGroup, Tag, Trigger, Variable, WireTag,
    WireTrigger, WireVariable,
};
use tagsync_reconciler::{GroupOutcome, GroupReconciler};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{Cli, Commands};
use crate::inventory::{Grouped, Inventory};

/// Execute a CLI command.
///
/// # Errors
///
/// Returns an error when input files, configuration or workspace
/// resolution fail. Reconciliation failures are reported through the
/// exit code instead.
pub async fn execute(cli: Cli, cancel: CancellationToken) -> Result<ExitCode> {
    let mut state = Inventory::load_state(&cli.state)
        .with_context(|| format!("Failed to load state from {}", cli.state.display()))?;

    let tally = match &cli.command {
        Commands::Plan { manifest } => {
            let manifest = load_manifest(manifest)?;
            let session = Session::new(Remotes::offline(&state), cancel);
            session.run(Step::Plan(&manifest), &mut state).await?
        }
        Commands::Apply { manifest } => {
            let manifest = load_manifest(manifest)?;
            let session = Session::open(&cli, &state, cancel).await?;
            session.run(Step::Apply(&manifest), &mut state).await?
        }
        Commands::Refresh => {
            let session = Session::open(&cli, &state, cancel).await?;
            session.run(Step::Refresh, &mut state).await?
        }
        Commands::Destroy => {
            let session = Session::open(&cli, &state, cancel).await?;
            session.run(Step::Destroy, &mut state).await?
        }
    };

    if !matches!(cli.command, Commands::Plan { .. }) {
        state
            .save_json(&cli.state)
            .with_context(|| format!("Failed to write state to {}", cli.state.display()))?;
        info!(path = %cli.state.display(), objects = state.len(), "State written");
    }

    println!("{}", tally.summary(verb(&cli.command)));
    Ok(if tally.failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

const fn verb(command: &Commands) -> &'static str {
    match command {
        Commands::Plan { .. } => "Plan",
        Commands::Apply { .. } => "Apply",
        Commands::Refresh => "Refresh",
        Commands::Destroy => "Destroy",
    }
}

fn load_manifest(path: &Path) -> Result<Inventory> {
    Inventory::load(path).with_context(|| format!("Failed to load manifest {}", path.display()))
}

/// Client configuration from `--config`, then `TAGSYNC_*` variables.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ClientConfig::default(),
    };
    Ok(config.with_overrides(|key| std::env::var(key).ok()))
}

/// What a run does to each group.
#[derive(Debug, Clone, Copy)]
enum Step<'a> {
    Plan(&'a Inventory),
    Apply(&'a Inventory),
    Refresh,
    Destroy,
}

/// Changes made and failures hit over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub changes: usize,
    pub failures: usize,
}

impl Tally {
    fn add<O: ManagedObject>(&mut self, outcome: &GroupOutcome<O>) {
        self.changes = self.changes.saturating_add(outcome.actions.len());
        self.failures = self.failures.saturating_add(outcome.errors.len());
    }

    fn summary(&self, verb: &str) -> String {
        format!(
            "{verb} complete: {} change(s), {} error(s)",
            self.changes, self.failures
        )
    }
}

/// Remote clients for each object kind.
#[derive(Clone)]
pub struct Remotes {
    tags: Arc<dyn RemoteResource<WireTag>>,
    triggers: Arc<dyn RemoteResource<WireTrigger>>,
    variables: Arc<dyn RemoteResource<WireVariable>>,
}

impl Remotes {
    /// In-memory remotes holding exactly the tracked objects.
    pub fn offline(state: &Inventory) -> Self {
        Self {
            tags: Arc::new(seeded(&state.tags)),
            triggers: Arc::new(seeded(&state.triggers)),
            variables: Arc::new(seeded(&state.variables)),
        }
    }

    /// HTTP remotes scoped to the configured workspace, created if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is incomplete or the workspace
    /// cannot be resolved.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        config.validate().context("Invalid client configuration")?;
        let workspace = config.workspace_name.clone();
        let client = Arc::new(GtmClient::new(config)?);
        let scope = WorkspaceScope::resolve(&client, &workspace)
            .await
            .with_context(|| format!("Failed to resolve workspace '{workspace}'"))?;
        info!(workspace = %scope.name, id = %scope.workspace_id, "Using workspace");

        Ok(Self {
            tags: Arc::new(scope.resource::<WireTag>(Arc::clone(&client))),
            triggers: Arc::new(scope.resource::<WireTrigger>(Arc::clone(&client))),
            variables: Arc::new(scope.resource::<WireVariable>(client)),
        })
    }
}

fn seeded<O: ManagedObject>(group: &ResourceGroup<O>) -> InMemoryResource<O::Wire> {
    InMemoryResource::from_objects(group.values().map(ManagedObject::to_wire))
}

/// Object kinds with a remote client in [`Remotes`].
trait Remote: Grouped {
    fn remote(remotes: &Remotes) -> Arc<dyn RemoteResource<Self::Wire>>;
}

impl Remote for Tag {
    fn remote(remotes: &Remotes) -> Arc<dyn RemoteResource<WireTag>> {
        Arc::clone(&remotes.tags)
    }
}

impl Remote for Trigger {
    fn remote(remotes: &Remotes) -> Arc<dyn RemoteResource<WireTrigger>> {
        Arc::clone(&remotes.triggers)
    }
}

impl Remote for Variable {
    fn remote(remotes: &Remotes) -> Arc<dyn RemoteResource<WireVariable>> {
        Arc::clone(&remotes.variables)
    }
}

/// Remotes plus the settings every group reconciler shares.
struct Session {
    remotes: Remotes,
    schema: Arc<ParameterSchema>,
    cancel: CancellationToken,
}

impl Session {
    fn new(remotes: Remotes, cancel: CancellationToken) -> Self {
        Self {
            remotes,
            schema: Arc::new(ParameterSchema::standard()),
            cancel,
        }
    }

    async fn open(cli: &Cli, state: &Inventory, cancel: CancellationToken) -> Result<Self> {
        let remotes = if cli.offline {
            info!(objects = state.len(), "Offline: remote seeded from state");
            Remotes::offline(state)
        } else {
            Remotes::connect(load_config(cli.config.as_deref())?).await?
        };
        Ok(Self::new(remotes, cancel))
    }

    fn reconciler<O: Remote>(&self) -> Result<GroupReconciler<O>> {
        Ok(GroupReconciler::<O>::builder()
            .with_remote(O::remote(&self.remotes))
            .with_schema(Arc::clone(&self.schema))
            .with_cancellation(self.cancel.child_token())
            .build()?)
    }

    /// Run `step` over the groups a manifest declares, in its order, or
    /// over every tracked group.
    async fn run(&self, step: Step<'_>, state: &mut Inventory) -> Result<Tally> {
        let kinds = match step {
            Step::Plan(manifest) | Step::Apply(manifest) => manifest.declared().to_vec(),
            Step::Refresh | Step::Destroy => state.kinds(),
        };

        let mut tally = Tally::default();
        for kind in kinds {
            match kind {
                ObjectKind::Tag => self.run_group::<Tag>(step, state, &mut tally).await?,
                ObjectKind::Trigger => self.run_group::<Trigger>(step, state, &mut tally).await?,
                ObjectKind::Variable => self.run_group::<Variable>(step, state, &mut tally).await?,
            }
            state.declare(kind);
        }
        Ok(tally)
    }

    async fn run_group<O: Remote>(
        &self,
        step: Step<'_>,
        state: &mut Inventory,
        tally: &mut Tally,
    ) -> Result<()> {
        let reconciler = self.reconciler::<O>()?;
        let tracked = state.group::<O>();

        let outcome = match step {
            Step::Plan(manifest) => plan(&reconciler, manifest.group::<O>(), tracked),
            Step::Apply(manifest) if tracked.is_empty() => {
                reconciler.create(manifest.group::<O>()).await
            }
            Step::Apply(manifest) => reconciler.update(manifest.group::<O>(), tracked).await,
            Step::Refresh => reconciler.read(tracked).await,
            Step::Destroy => reconciler.delete(tracked).await,
        };

        report(&outcome);
        tally.add(&outcome);
        *state.group_mut::<O>() = outcome.state;
        Ok(())
    }
}

/// Validation and planned actions, with `tracked` left as is.
fn plan<O: ManagedObject>(
    reconciler: &GroupReconciler<O>,
    desired: &ResourceGroup<O>,
    tracked: &ResourceGroup<O>,
) -> GroupOutcome<O> {
    let mut outcome = GroupOutcome::new(tracked.clone());
    match reconciler.validate(desired) {
        Ok(()) => outcome.actions = reconciler.plan(desired, tracked),
        Err(e) => outcome.errors.push(e),
    }
    outcome
}

fn report<O: ManagedObject>(outcome: &GroupOutcome<O>) {
    let kind = O::KIND;
    if !outcome.actions.is_empty() {
        println!("{}:", kind.collection());
    }
    for action in &outcome.actions {
        println!("  {}", action.description(kind));
    }
    for error in &outcome.errors {
        eprintln!("error: {error}");
    }
}
