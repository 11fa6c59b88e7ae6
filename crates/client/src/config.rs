//! Configuration for the tag-manager client.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://tagmanager.googleapis.com/tagmanager/v2/";

/// Configuration for the [`GtmClient`](crate::GtmClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, ending in `/`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Account that owns the container.
    #[serde(default)]
    pub account_id: String,

    /// Container holding the managed workspace.
    #[serde(default)]
    pub container_id: String,

    /// Workspace to manage; created when missing.
    #[serde(default)]
    pub workspace_name: String,

    /// OAuth bearer token.
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Rate limit for outbound calls; unset or zero disables pacing.
    #[serde(default)]
    pub max_api_queries_per_minute: Option<u32>,

    /// Timeout for each request.
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            account_id: String::new(),
            container_id: String::new(),
            workspace_name: String::new(),
            access_token: None,
            max_api_queries_per_minute: None,
            timeout: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Create a config for one workspace of one container.
    pub fn new(
        account_id: impl Into<String>,
        container_id: impl Into<String>,
        workspace_name: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            container_id: container_id.into(),
            workspace_name: workspace_name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    #[must_use]
    pub const fn max_api_queries_per_minute(mut self, limit: u32) -> Self {
        self.max_api_queries_per_minute = Some(limit);
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fixed delay between consecutive outbound calls, if pacing is on.
    pub fn pacing_interval(&self) -> Option<Duration> {
        self.max_api_queries_per_minute
            .and_then(|limit| Duration::from_secs(60).checked_div(limit))
    }

    /// Load configuration from `TAGSYNC_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup. Unparseable numbers are ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("TAGSYNC_BASE_URL") {
            self.base_url = url;
        }
        if let Some(account) = lookup("TAGSYNC_ACCOUNT_ID") {
            self.account_id = account;
        }
        if let Some(container) = lookup("TAGSYNC_CONTAINER_ID") {
            self.container_id = container;
        }
        if let Some(workspace) = lookup("TAGSYNC_WORKSPACE") {
            self.workspace_name = workspace;
        }
        if let Some(token) = lookup("TAGSYNC_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(limit) = lookup("TAGSYNC_MAX_API_QUERIES_PER_MINUTE")
            .and_then(|v| v.parse().ok())
        {
            self.max_api_queries_per_minute = Some(limit);
        }
        if let Some(secs) = lookup("TAGSYNC_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Load configuration from a TOML file, or JSON by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        if path.extension().is_some_and(|e| e == "json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            toml::from_str(&content)
                .map_err(|e| Error::config(format!("failed to parse {}: {e}", path.display())))
        }
    }

    /// Check that the config names a workspace the client can reach.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing setting.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("account_id", &self.account_id),
            ("container_id", &self.container_id),
            ("workspace_name", &self.workspace_name),
            ("base_url", &self.base_url),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(Error::config(format!("{field} is required")));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be positive"));
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Serialization helper for Duration as seconds.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.pacing_interval().is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("6000", "31", "tagsync")
            .base_url("http://localhost:9000/")
            .access_token("secret")
            .max_api_queries_per_minute(15)
            .timeout(Duration::from_secs(5));

        assert_eq!(config.base_url, "http://localhost:9000/");
        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(config.pacing_interval(), Some(Duration::from_secs(4)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_rate_disables_pacing() {
        let config = ClientConfig::new("1", "2", "w").max_api_queries_per_minute(0);
        assert!(config.pacing_interval().is_none());
    }

    #[test]
    fn test_validate_names_missing_field() {
        let err = ClientConfig::new("1", "", "w").validate().unwrap_err();
        assert!(err.to_string().contains("container_id"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TAGSYNC_ACCOUNT_ID", "6000"),
            ("TAGSYNC_CONTAINER_ID", "31"),
            ("TAGSYNC_WORKSPACE", "staging"),
            ("TAGSYNC_MAX_API_QUERIES_PER_MINUTE", "30"),
            ("TAGSYNC_TIMEOUT_SECS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::default().with_overrides(|k| vars.get(k).map(ToString::to_string));
        assert_eq!(config.workspace_name, "staging");
        assert_eq!(config.pacing_interval(), Some(Duration::from_secs(2)));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "account_id = \"6000\"\ncontainer_id = \"31\"\nworkspace_name = \"tagsync\"\ntimeout = 10"
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.account_id, "6000");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"account_id":"1","container_id":"2","workspace_name":"w","max_api_queries_per_minute":60}}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pacing_interval(), Some(Duration::from_secs(1)));
    }
}
