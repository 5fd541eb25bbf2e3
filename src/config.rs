//! Configuration loading and management.
//!
//! Handles parsing of `config.toml` in the ptrack directory. Credentials may
//! also come from the environment (see `cli.rs`), which takes precedence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::Strategy;

pub const DEFAULT_API_BASE_URL: &str = "https://graph.microsoft.com/v1.0/planner";
pub const DEFAULT_AUTHORITY_URL: &str = "https://login.microsoftonline.com";
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Directory tenant, also used in task permalinks.
    #[serde(default)]
    pub tenant_id: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,

    /// Plans to pull, fetched in this order.
    #[serde(default)]
    pub plan_ids: Vec<String>,

    /// Default aggregation strategy when none is given on the command line.
    #[serde(default)]
    pub strategy: Strategy,

    #[serde(default)]
    pub api: ApiConfig,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_authority_url")]
    pub authority_url: String,

    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_authority_url() -> String {
    DEFAULT_AUTHORITY_URL.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            authority_url: default_authority_url(),
            scope: default_scope(),
        }
    }
}

/// Values that override the file, typically from flags or environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a file if it exists, or return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply non-empty overrides on top of file values.
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        let pick = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        if let Some(v) = pick(overrides.tenant_id) {
            self.tenant_id = v;
        }
        if let Some(v) = pick(overrides.client_id) {
            self.client_id = v;
        }
        if let Some(v) = pick(overrides.client_secret) {
            self.client_secret = v;
        }
        self
    }

    /// Validate the configuration needed for a fetch run.
    ///
    /// Client credentials are only required when no bearer token was supplied.
    pub fn validate_for_fetch(&self, has_token: bool) -> Result<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(Error::InvalidConfig("tenant_id is required".into()));
        }
        if self.plan_ids.iter().all(|p| p.trim().is_empty()) {
            return Err(Error::InvalidConfig("plan_ids must list at least one plan".into()));
        }
        if !has_token {
            if self.client_id.trim().is_empty() {
                return Err(Error::InvalidConfig("client_id is required".into()));
            }
            if self.client_secret.trim().is_empty() {
                return Err(Error::InvalidConfig("client_secret is required".into()));
            }
        }
        Ok(())
    }

    /// Configured plan IDs with blanks removed, in order.
    pub fn plan_ids(&self) -> Vec<String> {
        self.plan_ids
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}
