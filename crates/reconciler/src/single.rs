//! Lifecycle of a single object declared on its own.

use std::sync::Arc;

use tagsync_client::RemoteResource;
use tagsync_model::{ManagedObject, ParameterSchema, WireObject};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Phase;

/// Create, read, update and delete one object by its remote id.
pub struct ObjectReconciler<O: ManagedObject> {
    remote: Arc<dyn RemoteResource<O::Wire>>,
    schema: Arc<ParameterSchema>,
}

impl<O: ManagedObject> ObjectReconciler<O> {
    pub fn new(remote: Arc<dyn RemoteResource<O::Wire>>, schema: Arc<ParameterSchema>) -> Self {
        Self { remote, schema }
    }

    fn validate(&self, desired: &O) -> Result<()> {
        desired
            .validate(&self.schema)
            .map_err(|source| Error::validation(O::KIND, source))
    }

    fn id_of(tracked: &O, phase: Phase) -> Result<&str> {
        tracked
            .remote_id()
            .as_str()
            .ok_or_else(|| Error::missing_id(O::KIND, phase, tracked.name()))
    }

    /// # Errors
    ///
    /// Returns an error if validation or the remote call fails.
    pub async fn create(&self, desired: &O) -> Result<O> {
        self.validate(desired)?;
        let created = self
            .remote
            .create(&desired.to_wire())
            .await
            .map_err(|source| Error::remote(O::KIND, Phase::Create, desired.name(), source))?;
        let created = O::from_wire(created);
        info!(kind = %O::KIND, name = %created.name(), id = %created.remote_id(), "Created");
        Ok(created)
    }

    /// Fetch the current remote form; `None` when it no longer exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails for any reason other than
    /// the object being absent.
    pub async fn read(&self, tracked: &O) -> Result<Option<O>> {
        let Some(id) = tracked.remote_id().as_str() else {
            return Ok(None);
        };
        match self.remote.get(id).await {
            Ok(found) => Ok(Some(O::from_wire(found))),
            Err(e) if e.is_not_found() => {
                debug!(kind = %O::KIND, name = %tracked.name(), id, "Gone from remote");
                Ok(None)
            }
            Err(source) => Err(Error::remote(O::KIND, Phase::Read, tracked.name(), source)),
        }
    }

    /// Replace the remote object when its content differs from `desired`.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or the remote call fails, or the
    /// tracked object has no id.
    pub async fn update(&self, desired: &O, tracked: &O) -> Result<O> {
        self.validate(desired)?;
        if desired.content_eq(tracked) {
            return Ok(tracked.clone());
        }
        let id = Self::id_of(tracked, Phase::Update)?;

        let mut payload = desired.to_wire();
        payload.set_id(id.to_string());
        let updated = self
            .remote
            .update(id, &payload)
            .await
            .map_err(|source| Error::remote(O::KIND, Phase::Update, tracked.name(), source))?;
        info!(kind = %O::KIND, name = %desired.name(), id, "Updated");
        Ok(O::from_wire(updated))
    }

    /// Delete the remote object. Already being gone counts as success.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote call fails for any other reason.
    pub async fn delete(&self, tracked: &O) -> Result<()> {
        let Some(id) = tracked.remote_id().as_str() else {
            return Ok(());
        };
        match self.remote.delete(id).await {
            Ok(()) => {
                info!(kind = %O::KIND, name = %tracked.name(), id, "Deleted");
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(source) => Err(Error::remote(O::KIND, Phase::Delete, tracked.name(), source)),
        }
    }
}

impl<O: ManagedObject> Clone for ObjectReconciler<O> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            schema: Arc::clone(&self.schema),
        }
    }
}
