//! HTTP client for the tag-manager API.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tagsync_model::{WireObject, WireWorkspace};
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pacer::Pacer;

const WORKSPACE_KIND: &str = "workspace";

/// Client for one container of the tag-manager API.
#[derive(Debug, Clone)]
pub struct GtmClient {
    config: Arc<ClientConfig>,
    base_url: Url,
    http_client: reqwest::Client,
    pacer: Arc<Pacer>,
}

impl GtmClient {
    /// Create a client with its own pacer.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is incomplete or the base URL is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let pacer = Arc::new(Pacer::new(config.pacing_interval()));
        Self::with_pacer(config, pacer)
    }

    /// Create a client sharing an existing pacer.
    ///
    /// # Errors
    ///
    /// Returns an error when the config is incomplete or the base URL is invalid.
    pub fn with_pacer(config: ClientConfig, pacer: Arc<Pacer>) -> Result<Self> {
        config.validate()?;

        let base_url = if config.base_url.ends_with('/') {
            Url::parse(&config.base_url)?
        } else {
            Url::parse(&format!("{}/", config.base_url))?
        };

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            base_url,
            http_client,
            pacer,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn pacer(&self) -> &Arc<Pacer> {
        &self.pacer
    }

    /// `accounts/{account}/containers/{container}`
    pub fn container_path(&self) -> String {
        format!(
            "accounts/{}/containers/{}",
            self.config.account_id, self.config.container_id
        )
    }

    fn workspace_path(&self, workspace_id: &str) -> String {
        format!("{}/workspaces/{workspace_id}", self.container_path())
    }

    fn collection_path<W: WireObject>(&self, workspace_id: &str) -> String {
        format!(
            "{}/{}",
            self.workspace_path(workspace_id),
            W::KIND.collection()
        )
    }

    fn object_path<W: WireObject>(&self, workspace_id: &str, id: &str) -> String {
        format!("{}/{id}", self.collection_path::<W>(workspace_id))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Pace, send, and map the status to an error.
    async fn send(&self, builder: RequestBuilder, kind: &str, target: &str) -> Result<Response> {
        self.pacer.wait().await;
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(Error::not_found(kind, target));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::status(status.as_u16(), body));
        }
        Ok(response)
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        kind: &str,
        target: &str,
    ) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%method, path, "Calling tag-manager API");
        let url = self.base_url.join(path)?;
        let builder = match body {
            Some(body) => self.request(method, url).json(body),
            None => self.request(method, url),
        };
        let response = self.send(builder, kind, target).await?;
        Ok(response.json().await?)
    }

    async fn call_empty(&self, method: Method, path: &str, kind: &str, target: &str) -> Result<()> {
        debug!(%method, path, "Calling tag-manager API");
        let url = self.base_url.join(path)?;
        self.send(self.request(method, url), kind, target).await?;
        Ok(())
    }

    /// Follow `nextPageToken` until every item under `field` is collected.
    async fn list_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &str,
        kind: &str,
    ) -> Result<Vec<T>> {
        let base = self.base_url.join(path)?;
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = base.clone();
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }
            debug!(path, page = ?page_token, "Listing from tag-manager API");

            let mut page: Value = self
                .send(self.request(Method::GET, url), kind, path)
                .await?
                .json()
                .await?;
            if !page.is_object() {
                return Err(Error::invalid_response(format!(
                    "expected an object when listing {path}"
                )));
            }
            if let Some(list) = page.get_mut(field).map(Value::take) {
                items.extend(serde_json::from_value::<Vec<T>>(list)?);
            }

            page_token = page
                .get("nextPageToken")
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(str::to_string);
            if page_token.is_none() {
                return Ok(items);
            }
        }
    }

    // Workspaces

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_workspace(&self, workspace: &WireWorkspace) -> Result<WireWorkspace> {
        let path = format!("{}/workspaces", self.container_path());
        self.call(Method::POST, &path, Some(workspace), WORKSPACE_KIND, &workspace.name)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_workspaces(&self) -> Result<Vec<WireWorkspace>> {
        let path = format!("{}/workspaces", self.container_path());
        self.list_paged(&path, WORKSPACE_KIND, WORKSPACE_KIND).await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the workspace does not exist.
    pub async fn get_workspace(&self, workspace_id: &str) -> Result<WireWorkspace> {
        let path = self.workspace_path(workspace_id);
        self.call::<(), _>(Method::GET, &path, None, WORKSPACE_KIND, workspace_id)
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the workspace does not exist.
    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        workspace: &WireWorkspace,
    ) -> Result<WireWorkspace> {
        let path = self.workspace_path(workspace_id);
        self.call(Method::PUT, &path, Some(workspace), WORKSPACE_KIND, workspace_id)
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the workspace does not exist.
    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<()> {
        let path = self.workspace_path(workspace_id);
        self.call_empty(Method::DELETE, &path, WORKSPACE_KIND, workspace_id)
            .await
    }

    // Tags, triggers and variables

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_object<W: WireObject>(&self, workspace_id: &str, object: &W) -> Result<W> {
        let path = self.collection_path::<W>(workspace_id);
        self.call(Method::POST, &path, Some(object), W::KIND.as_str(), object.name())
            .await
    }

    /// # Errors
    ///
    /// Returns an error if any page fails.
    pub async fn list_objects<W: WireObject>(&self, workspace_id: &str) -> Result<Vec<W>> {
        let path = self.collection_path::<W>(workspace_id);
        self.list_paged(&path, W::KIND.list_field(), W::KIND.as_str())
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the object does not exist.
    pub async fn get_object<W: WireObject>(&self, workspace_id: &str, id: &str) -> Result<W> {
        let path = self.object_path::<W>(workspace_id, id);
        self.call::<(), _>(Method::GET, &path, None, W::KIND.as_str(), id)
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the object does not exist.
    pub async fn update_object<W: WireObject>(
        &self,
        workspace_id: &str,
        id: &str,
        object: &W,
    ) -> Result<W> {
        let path = self.object_path::<W>(workspace_id, id);
        self.call(Method::PUT, &path, Some(object), W::KIND.as_str(), id)
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when the object does not exist.
    pub async fn delete_object<W: WireObject>(&self, workspace_id: &str, id: &str) -> Result<()> {
        let path = self.object_path::<W>(workspace_id, id);
        self.call_empty(Method::DELETE, &path, W::KIND.as_str(), id)
            .await
    }
}
