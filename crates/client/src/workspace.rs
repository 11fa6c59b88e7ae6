//! Workspace resolution and per-kind resource clients.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tagsync_model::{WireObject, WireWorkspace};
use tracing::info;

use crate::error::Result;
use crate::http::GtmClient;
use crate::resource::RemoteResource;

/// A resolved workspace that object clients operate in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceScope {
    pub workspace_id: String,
    pub name: String,
}

impl WorkspaceScope {
    /// Find the workspace called `name`, creating it when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if listing or creating workspaces fails.
    pub async fn resolve(client: &GtmClient, name: &str) -> Result<Self> {
        let existing = client
            .list_workspaces()
            .await?
            .into_iter()
            .find(|workspace| workspace.name == name);

        let workspace = match existing {
            Some(workspace) => workspace,
            None => {
                info!(workspace = name, "Creating workspace");
                client
                    .create_workspace(&WireWorkspace {
                        name: name.to_string(),
                        description: "Managed by tagsync".to_string(),
                        ..WireWorkspace::default()
                    })
                    .await?
            }
        };

        Ok(Self {
            workspace_id: workspace.workspace_id,
            name: workspace.name,
        })
    }

    /// A client for one object kind inside this workspace.
    pub fn resource<W: WireObject>(&self, client: Arc<GtmClient>) -> ResourceClient<W> {
        ResourceClient::new(client, self.workspace_id.clone())
    }
}

/// [`RemoteResource`] for one object kind in one workspace.
#[derive(Debug)]
pub struct ResourceClient<W> {
    client: Arc<GtmClient>,
    workspace_id: String,
    _kind: PhantomData<fn() -> W>,
}

impl<W: WireObject> ResourceClient<W> {
    pub fn new(client: Arc<GtmClient>, workspace_id: impl Into<String>) -> Self {
        Self {
            client,
            workspace_id: workspace_id.into(),
            _kind: PhantomData,
        }
    }

    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }
}

impl<W> Clone for ResourceClient<W> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            workspace_id: self.workspace_id.clone(),
            _kind: PhantomData,
        }
    }
}

#[async_trait]
impl<W: WireObject> RemoteResource<W> for ResourceClient<W> {
    async fn create(&self, object: &W) -> Result<W> {
        self.client.create_object(&self.workspace_id, object).await
    }

    async fn list(&self) -> Result<Vec<W>> {
        self.client.list_objects(&self.workspace_id).await
    }

    async fn get(&self, id: &str) -> Result<W> {
        self.client.get_object(&self.workspace_id, id).await
    }

    async fn update(&self, id: &str, object: &W) -> Result<W> {
        self.client
            .update_object(&self.workspace_id, id, object)
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete_object::<W>(&self.workspace_id, id).await
    }
}
