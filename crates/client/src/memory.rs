//! Deterministic in-memory remote.
//!
//! Ids are assigned sequentially from 1, every call is logged, and failures
//! can be injected per operation and object name. Used by tests and by the
//! CLI's offline mode.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tagsync_model::WireObject;
use tokio::sync::RwLock;
use tracing::warn;

use crate::error::{Error, Result};
use crate::resource::RemoteResource;

/// A remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    List,
    Get,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One logged call. `target` is the object name for creates and the id
/// otherwise; empty for lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCall {
    pub operation: Operation,
    pub target: String,
}

/// In-memory [`RemoteResource`] keyed by id.
pub struct InMemoryResource<W> {
    objects: RwLock<BTreeMap<String, W>>,
    next_id: AtomicU64,
    calls: RwLock<Vec<RemoteCall>>,
    failures: RwLock<HashSet<(Operation, String)>>,
    renames: RwLock<HashMap<String, String>>,
}

impl<W: WireObject> InMemoryResource<W> {
    pub fn new() -> Self {
        Self::from_objects(Vec::new())
    }

    /// Seed with existing objects. Objects without an id get the next
    /// sequential one; numbering continues after the largest numeric id.
    /// Objects without an id are dropped once the id space is exhausted.
    pub fn from_objects(objects: impl IntoIterator<Item = W>) -> Self {
        let objects: Vec<W> = objects.into_iter().collect();
        let first_free = objects
            .iter()
            .filter_map(|object| object.id().parse::<u64>().ok())
            .max()
            .map_or(Some(1), |max| max.checked_add(1));

        let next_id = AtomicU64::new(first_free.unwrap_or(u64::MAX));
        let stored = objects
            .into_iter()
            .filter_map(|mut object| {
                if object.id().is_empty() {
                    let Some(id) = allocate(&next_id) else {
                        warn!(kind = %W::KIND, name = object.name(), "No id left, dropping seed");
                        return None;
                    };
                    object.set_id(id);
                }
                Some((object.id().to_string(), object))
            })
            .collect();

        Self {
            objects: RwLock::new(stored),
            next_id,
            calls: RwLock::new(Vec::new()),
            failures: RwLock::new(HashSet::new()),
            renames: RwLock::new(HashMap::new()),
        }
    }

    /// Make every `operation` touching the object called `name` fail.
    /// Use an empty name for [`Operation::List`].
    pub async fn fail_on(&self, operation: Operation, name: impl Into<String>) {
        self.failures.write().await.insert((operation, name.into()));
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Store objects submitted as `from` under the name `to`, as a remote
    /// that normalizes names would.
    pub async fn rename_on_write(&self, from: impl Into<String>, to: impl Into<String>) {
        self.renames.write().await.insert(from.into(), to.into());
    }

    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    /// Snapshot of stored objects in id order.
    pub async fn objects(&self) -> Vec<W> {
        self.objects.read().await.values().cloned().collect()
    }

    pub async fn find_by_name(&self, name: &str) -> Option<W> {
        self.objects
            .read()
            .await
            .values()
            .find(|object| object.name() == name)
            .cloned()
    }

    async fn record(&self, operation: Operation, target: &str) {
        self.calls.write().await.push(RemoteCall {
            operation,
            target: target.to_string(),
        });
    }

    async fn check(&self, operation: Operation, name: &str) -> Result<()> {
        if self
            .failures
            .read()
            .await
            .contains(&(operation, name.to_string()))
        {
            return Err(Error::injected(operation.to_string(), name));
        }
        Ok(())
    }

    async fn name_of(&self, id: &str) -> Result<String> {
        self.objects
            .read()
            .await
            .get(id)
            .map(|object| object.name().to_string())
            .ok_or_else(|| Error::not_found(W::KIND.as_str(), id))
    }

    async fn stored_form(&self, object: &W, id: String) -> W {
        let mut stored = object.clone();
        stored.set_id(id);
        if let Some(renamed) = self.renames.read().await.get(object.name()) {
            stored.set_name(renamed.clone());
        }
        stored
    }
}

/// Claim the next id. `u64::MAX` is never handed out; reaching it means
/// the id space is exhausted.
fn allocate(next_id: &AtomicU64) -> Option<String> {
    next_id
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
        .ok()
        .map(|id| id.to_string())
}

impl<W: WireObject> Default for InMemoryResource<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WireObject> fmt::Debug for InMemoryResource<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryResource")
            .field("kind", &W::KIND)
            .field("next_id", &self.next_id.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<W: WireObject> RemoteResource<W> for InMemoryResource<W> {
    async fn create(&self, object: &W) -> Result<W> {
        self.record(Operation::Create, object.name()).await;
        self.check(Operation::Create, object.name()).await?;

        let id = allocate(&self.next_id)
            .ok_or_else(|| Error::invalid_response(format!("no {} ids left", W::KIND)))?;
        let stored = self.stored_form(object, id.clone()).await;
        self.objects.write().await.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<W>> {
        self.record(Operation::List, "").await;
        self.check(Operation::List, "").await?;
        Ok(self.objects().await)
    }

    async fn get(&self, id: &str) -> Result<W> {
        self.record(Operation::Get, id).await;
        let name = self.name_of(id).await?;
        self.check(Operation::Get, &name).await?;

        self.objects
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(W::KIND.as_str(), id))
    }

    async fn update(&self, id: &str, object: &W) -> Result<W> {
        self.record(Operation::Update, id).await;
        let name = self.name_of(id).await?;
        self.check(Operation::Update, &name).await?;

        let stored = self.stored_form(object, id.to_string()).await;
        self.objects
            .write()
            .await
            .insert(id.to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(Operation::Delete, id).await;
        let name = self.name_of(id).await?;
        self.check(Operation::Delete, &name).await?;

        self.objects.write().await.remove(id);
        Ok(())
    }
}
