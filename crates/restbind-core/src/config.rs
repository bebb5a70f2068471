//! Client configuration.
//!
//! This module defines the `Config` struct used to build an
//! [`ApiClient`](crate::client::ApiClient) and to load API manifests. The
//! configuration can be created programmatically or loaded from a YAML, JSON
//! or TOML file; the format is picked from the file extension.
//!
//! # Examples
//!
//! ```no_run
//! use restbind_core::config::Config;
//! use url::Url;
//!
//! # #[tokio::main]
//! # async fn main() -> restbind_core::Result<()> {
//! // Create a new config programmatically
//! let mut config = Config::new(Url::parse("https://api.example.com/v1").unwrap());
//! config.bearer_token = Some("secret".to_string());
//!
//! // Or load from a config file
//! let config = Config::from_file("restbind.yaml").await?;
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::path::Path;

use crate::api::UnresolvedTokenPolicy;

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

/// Configuration for calling a described API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL every resolved path is appended to
    pub base_url: Url,

    /// Bearer token sent in the `Authorization` header
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Handling of path tokens without a binding when loading manifests
    #[serde(default)]
    pub unresolved_tokens: UnresolvedTokenPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
    Yaml,
}

impl Format {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::Json,
            Some("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

impl Config {
    /// Create a new Config with default values
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            bearer_token: None,
            timeout_secs: None,
            unresolved_tokens: UnresolvedTokenPolicy::default(),
        }
    }

    /// Load configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        let config = match Format::of(path) {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
            Format::Yaml => serde_yaml::from_str(&content)?,
        };
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let path = path.as_ref();
        let content = match Format::of(path) {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string(self)?,
            Format::Yaml => serde_yaml::to_string(self)?,
        };
        fs::write(path, content).await?;
        Ok(())
    }
}
