//! Group reconciler: converges a named set of objects in one pass.

use std::sync::Arc;

use tagsync_client::RemoteResource;
use tagsync_model::{ManagedObject, ParameterSchema, ResourceGroup, WireObject};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{GroupOutcome, Phase, PhaseKeys, ReconcileAction, diff};

/// Reconciles a [`ResourceGroup`] of one object kind against the remote.
///
/// Each entry point runs one pass with sequential remote calls. A failure
/// stops the phase it happens in; later phases still run. The returned
/// state always reflects exactly the calls that succeeded.
pub struct GroupReconciler<O: ManagedObject> {
    remote: Arc<dyn RemoteResource<O::Wire>>,
    schema: Arc<ParameterSchema>,
    cancel: CancellationToken,
}

impl<O: ManagedObject> GroupReconciler<O> {
    pub fn new(remote: Arc<dyn RemoteResource<O::Wire>>, schema: Arc<ParameterSchema>) -> Self {
        Self {
            remote,
            schema,
            cancel: CancellationToken::new(),
        }
    }

    pub fn builder() -> ReconcilerBuilder<O> {
        ReconcilerBuilder::new()
    }

    /// Token checked before every remote call.
    pub const fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub const fn schema(&self) -> &Arc<ParameterSchema> {
        &self.schema
    }

    /// Validate every desired object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for the first invalid object in name order.
    pub fn validate(&self, desired: &ResourceGroup<O>) -> Result<()> {
        desired
            .values()
            .try_for_each(|object| object.validate(&self.schema))
            .map_err(|source| Error::validation(O::KIND, source))
    }

    /// Actions [`update`](Self::update) would attempt, without calling the remote.
    pub fn plan(
        &self,
        desired: &ResourceGroup<O>,
        tracked: &ResourceGroup<O>,
    ) -> Vec<ReconcileAction> {
        diff(desired, tracked)
    }

    /// Create every desired object, starting from an empty state.
    pub async fn create(&self, desired: &ResourceGroup<O>) -> GroupOutcome<O> {
        if let Err(e) = self.validate(desired) {
            warn!(kind = %O::KIND, error = %e, "Rejected desired objects");
            return GroupOutcome::failed(ResourceGroup::new(), e);
        }
        info!(kind = %O::KIND, count = desired.len(), "Creating group");

        let names: Vec<String> = desired.names().map(str::to_string).collect();
        let mut pass = Pass::new(ResourceGroup::new());
        self.create_phase(&mut pass, desired, &names).await;
        pass.finish()
    }

    /// Refresh tracked objects from one remote listing.
    ///
    /// Only names already tracked are kept. On failure the tracked state is
    /// returned unchanged.
    pub async fn read(&self, tracked: &ResourceGroup<O>) -> GroupOutcome<O> {
        let mut pass = Pass::new(tracked.clone());
        if !pass.proceed(&self.cancel, Phase::Read) {
            return pass.finish();
        }

        match self.remote.list().await {
            Ok(objects) => {
                let state: ResourceGroup<O> = objects
                    .into_iter()
                    .filter(|object| tracked.contains(object.name()))
                    .map(O::from_wire)
                    .collect();
                debug!(
                    kind = %O::KIND,
                    tracked = tracked.len(),
                    found = state.len(),
                    "Read group"
                );
                GroupOutcome::new(state)
            }
            Err(source) => {
                warn!(kind = %O::KIND, error = %source, "Listing failed");
                GroupOutcome::failed(tracked.clone(), Error::list_failed(O::KIND, source))
            }
        }
    }

    /// Converge `tracked` to `desired`: delete, then create, then update.
    pub async fn update(
        &self,
        desired: &ResourceGroup<O>,
        tracked: &ResourceGroup<O>,
    ) -> GroupOutcome<O> {
        if let Err(e) = self.validate(desired) {
            warn!(kind = %O::KIND, error = %e, "Rejected desired objects");
            return GroupOutcome::failed(tracked.clone(), e);
        }

        let keys = PhaseKeys::split(desired, tracked);
        debug!(
            kind = %O::KIND,
            delete = keys.delete.len(),
            create = keys.create.len(),
            candidates = keys.update.len(),
            "Updating group"
        );

        let mut pass = Pass::new(tracked.clone());
        self.delete_phase(&mut pass, &keys.delete).await;
        self.create_phase(&mut pass, desired, &keys.create).await;
        self.update_phase(&mut pass, desired, &keys.update).await;
        pass.finish()
    }

    /// Delete every tracked object.
    pub async fn delete(&self, tracked: &ResourceGroup<O>) -> GroupOutcome<O> {
        info!(kind = %O::KIND, count = tracked.len(), "Deleting group");
        let names: Vec<String> = tracked.names().map(str::to_string).collect();
        let mut pass = Pass::new(tracked.clone());
        self.delete_phase(&mut pass, &names).await;
        pass.finish()
    }

    async fn delete_phase(&self, pass: &mut Pass<O>, names: &[String]) {
        for name in names {
            if !pass.proceed(&self.cancel, Phase::Delete) {
                return;
            }
            let Some(id) = pass.tracked_id(name) else {
                pass.stop(Error::missing_id(O::KIND, Phase::Delete, name));
                return;
            };

            match self.remote.delete(&id).await {
                Ok(()) => {
                    info!(kind = %O::KIND, name = %name, id = %id, "Deleted");
                    pass.state.remove(name);
                    pass.actions.push(ReconcileAction::Delete {
                        name: name.clone(),
                        id,
                    });
                }
                Err(source) => {
                    pass.stop(Error::remote(O::KIND, Phase::Delete, name, source));
                    return;
                }
            }
        }
    }

    async fn create_phase(&self, pass: &mut Pass<O>, desired: &ResourceGroup<O>, names: &[String]) {
        for name in names {
            let Some(object) = desired.get(name) else {
                continue;
            };
            if !pass.proceed(&self.cancel, Phase::Create) {
                return;
            }

            match self.remote.create(&object.to_wire()).await {
                Ok(created) => {
                    let created = O::from_wire(created);
                    info!(
                        kind = %O::KIND,
                        name = %created.name(),
                        id = %created.remote_id(),
                        "Created"
                    );
                    pass.actions.push(ReconcileAction::Create {
                        name: created.name().to_string(),
                    });
                    pass.track(created);
                }
                Err(source) => {
                    pass.stop(Error::remote(O::KIND, Phase::Create, name, source));
                    return;
                }
            }
        }
    }

    async fn update_phase(&self, pass: &mut Pass<O>, desired: &ResourceGroup<O>, names: &[String]) {
        for name in names {
            let Some(want) = desired.get(name) else {
                continue;
            };
            let unchanged = pass.state.get(name).is_none_or(|have| want.content_eq(have));
            if unchanged {
                continue;
            }
            if !pass.proceed(&self.cancel, Phase::Update) {
                return;
            }
            let Some(id) = pass.tracked_id(name) else {
                pass.stop(Error::missing_id(O::KIND, Phase::Update, name));
                return;
            };

            let mut payload = want.to_wire();
            payload.set_id(id.clone());
            match self.remote.update(&id, &payload).await {
                Ok(updated) => {
                    let updated = O::from_wire(updated);
                    info!(kind = %O::KIND, name = %updated.name(), id = %id, "Updated");
                    if updated.name() != name.as_str() {
                        pass.state.remove(name);
                    }
                    pass.actions.push(ReconcileAction::Update {
                        name: updated.name().to_string(),
                        id,
                    });
                    pass.track(updated);
                }
                Err(source) => {
                    pass.stop(Error::remote(O::KIND, Phase::Update, name, source));
                    return;
                }
            }
        }
    }
}

impl<O: ManagedObject> Clone for GroupReconciler<O> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            schema: Arc::clone(&self.schema),
            cancel: self.cancel.clone(),
        }
    }
}

/// Working state of one pass.
struct Pass<O: ManagedObject> {
    state: ResourceGroup<O>,
    actions: Vec<ReconcileAction>,
    errors: Vec<Error>,
    cancelled: bool,
}

impl<O: ManagedObject> Pass<O> {
    const fn new(state: ResourceGroup<O>) -> Self {
        Self {
            state,
            actions: Vec::new(),
            errors: Vec::new(),
            cancelled: false,
        }
    }

    /// Whether the next remote call may go out. Records a single
    /// cancellation for the whole pass.
    fn proceed(&mut self, cancel: &CancellationToken, phase: Phase) -> bool {
        if self.cancelled {
            return false;
        }
        if cancel.is_cancelled() {
            warn!(kind = %O::KIND, phase = %phase, "Reconciliation cancelled");
            self.cancelled = true;
            self.errors.push(Error::cancelled(O::KIND, phase));
            return false;
        }
        true
    }

    fn tracked_id(&self, name: &str) -> Option<String> {
        self.state
            .get(name)
            .and_then(|object| object.remote_id().as_str())
            .map(str::to_string)
    }

    /// Record `object` under its returned name. A tracked object already
    /// under that name with another id is dropped from state.
    fn track(&mut self, object: O) {
        let id = object.remote_id().clone();
        let name = object.name().to_string();
        if let Some(previous) = self.state.insert(object) {
            if previous.remote_id() != &id {
                warn!(
                    kind = %O::KIND,
                    name = %name,
                    id = %id,
                    previous_id = %previous.remote_id(),
                    "Replaced a tracked object with the same name"
                );
            }
        }
    }

    fn stop(&mut self, error: Error) {
        warn!(kind = %O::KIND, error = %error, "Phase stopped");
        self.errors.push(error);
    }

    fn finish(self) -> GroupOutcome<O> {
        GroupOutcome {
            state: self.state,
            actions: self.actions,
            errors: self.errors,
        }
    }
}

/// Builder for [`GroupReconciler`].
pub struct ReconcilerBuilder<O: ManagedObject> {
    remote: Option<Arc<dyn RemoteResource<O::Wire>>>,
    schema: Option<Arc<ParameterSchema>>,
    cancel: Option<CancellationToken>,
}

impl<O: ManagedObject> ReconcilerBuilder<O> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            remote: None,
            schema: None,
            cancel: None,
        }
    }

    /// Set the remote resource.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemoteResource<O::Wire>>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Set a shared schema; defaults to [`ParameterSchema::standard`].
    #[must_use]
    pub fn with_schema(mut self, schema: Arc<ParameterSchema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Share a cancellation token, typically a child of a process-wide one.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when no remote was set.
    pub fn build(self) -> Result<GroupReconciler<O>> {
        let remote = self
            .remote
            .ok_or_else(|| Error::invalid_config(format!("{} reconciler needs a remote", O::KIND)))?;

        Ok(GroupReconciler {
            remote,
            schema: self
                .schema
                .unwrap_or_else(|| Arc::new(ParameterSchema::standard())),
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}

impl<O: ManagedObject> Default for ReconcilerBuilder<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use tagsync_client::InMemoryResource;
    use tagsync_model::{Tag, WireTag};

    use super::*;

    #[test]
    fn test_builder_requires_remote() {
        let result = GroupReconciler::<Tag>::builder().build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_builder_defaults() {
        let remote: Arc<InMemoryResource<WireTag>> = Arc::new(InMemoryResource::new());
        let reconciler = GroupReconciler::<Tag>::builder()
            .with_remote(remote)
            .build()
            .unwrap();
        assert_eq!(
            reconciler.schema().max_depth(),
            tagsync_model::MAX_PARAMETER_DEPTH
        );
        assert!(!reconciler.cancellation_token().is_cancelled());
    }

    #[test]
    fn test_validate_reports_kind() {
        let remote: Arc<InMemoryResource<WireTag>> = Arc::new(InMemoryResource::new());
        let reconciler =
            GroupReconciler::<Tag>::new(remote, Arc::new(ParameterSchema::standard()));
        let desired = ResourceGroup::from_objects([Tag::new("broken", "")]).unwrap();
        let err = reconciler.validate(&desired).unwrap_err();
        assert_eq!(err.kind(), Some(tagsync_model::ObjectKind::Tag));
    }
}
