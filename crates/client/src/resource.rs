//! The remote resource seam used by the reconcilers.

use std::sync::Arc;

use async_trait::async_trait;
use tagsync_model::WireObject;

use crate::error::Result;

/// CRUD over one kind of object inside one workspace.
#[async_trait]
pub trait RemoteResource<W: WireObject>: Send + Sync {
    /// Create an object and return it as stored, with its new id.
    async fn create(&self, object: &W) -> Result<W>;

    /// List every object of this kind.
    async fn list(&self) -> Result<Vec<W>>;

    /// Fetch one object; [`Error::NotFound`](crate::Error::NotFound) when absent.
    async fn get(&self, id: &str) -> Result<W>;

    /// Replace an object and return it as stored.
    async fn update(&self, id: &str, object: &W) -> Result<W>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl<W: WireObject, R: RemoteResource<W> + ?Sized> RemoteResource<W> for Arc<R> {
    async fn create(&self, object: &W) -> Result<W> {
        (**self).create(object).await
    }

    async fn list(&self) -> Result<Vec<W>> {
        (**self).list().await
    }

    async fn get(&self, id: &str) -> Result<W> {
        (**self).get(id).await
    }

    async fn update(&self, id: &str, object: &W) -> Result<W> {
        (**self).update(id, object).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        (**self).delete(id).await
    }
}
