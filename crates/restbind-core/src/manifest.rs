//! Manifest file format for API descriptions.
//!
//! A manifest is the file form of an [`ApiDescription`]: the operations of one
//! API with their verbs, path templates and argument roles. Manifests may be
//! written in YAML or JSON.
//!
//! ```yaml
//! name: TodoApi
//! operations:
//!   - name: todo
//!     verb: GET
//!     path: /todos/:id
//!     params:
//!       - { position: 0, role: transport }
//!       - { position: 1, role: path, name: id }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::api::{ApiDescription, UnresolvedTokenPolicy};
use crate::error::{Error, Result};
use crate::registry::ParameterRole;
use crate::request::HttpVerb;

/// The root manifest structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiManifest {
    /// Name of the API description
    pub name: String,

    /// Operations in the order they are registered
    #[serde(default)]
    pub operations: Vec<OperationManifest>,
}

/// One described operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationManifest {
    pub name: String,
    pub verb: HttpVerb,
    pub path: String,
    #[serde(default)]
    pub params: Vec<ParamManifest>,
}

/// Role of one argument position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamManifest {
    pub position: usize,
    pub role: RoleKind,
    /// Parameter name; required for `path` and `query` roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Path,
    Query,
    Body,
    Transport,
}

impl ParamManifest {
    fn role(&self, operation: &str) -> Result<ParameterRole> {
        let named = |kind: &str| {
            self.name.clone().ok_or_else(|| {
                Error::config(format!(
                    "operation '{}': {} parameter at position {} needs a name",
                    operation, kind, self.position
                ))
            })
        };
        Ok(match self.role {
            RoleKind::Path => ParameterRole::PathParam(named("path")?),
            RoleKind::Query => ParameterRole::QueryParam(named("query")?),
            RoleKind::Body => ParameterRole::Body,
            RoleKind::Transport => ParameterRole::TransportHandle,
        })
    }

    fn from_role(position: usize, role: &ParameterRole) -> Self {
        let (role, name) = match role {
            ParameterRole::PathParam(name) => (RoleKind::Path, Some(name.clone())),
            ParameterRole::QueryParam(name) => (RoleKind::Query, Some(name.clone())),
            ParameterRole::Body => (RoleKind::Body, None),
            ParameterRole::TransportHandle => (RoleKind::Transport, None),
        };
        Self {
            position,
            role,
            name,
        }
    }
}

impl ApiManifest {
    /// Load a manifest from a YAML or JSON file.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::config(format!(
                "Failed to parse API manifest at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self> {
        match serde_json::from_str(content) {
            Ok(manifest) => Ok(manifest),
            Err(json_err) => serde_yaml::from_str(content).map_err(|yaml_err| {
                log::trace!("manifest is not JSON: {}", json_err);
                Error::from(yaml_err)
            }),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Describe every operation of the manifest.
    pub fn into_description(self, policy: UnresolvedTokenPolicy) -> Result<ApiDescription> {
        let mut api = ApiDescription::with_policy(self.name, policy);
        for operation in self.operations {
            let mut builder = api.describe(&operation.name, operation.verb, operation.path.clone());
            for param in &operation.params {
                builder = builder.bind(param.position, param.role(&operation.name)?);
            }
            builder.register()?;
        }
        Ok(api)
    }

    /// Manifest form of an existing description.
    pub fn from_description(api: &ApiDescription) -> Self {
        let operations = api
            .operations()
            .map(|(key, descriptor)| OperationManifest {
                name: key.operation().to_string(),
                verb: descriptor.verb,
                path: descriptor.template.as_str().to_string(),
                params: api
                    .registry()
                    .roles(key)
                    .map(|(position, role)| ParamManifest::from_role(position, role))
                    .collect(),
            })
            .collect();
        Self {
            name: api.name().to_string(),
            operations,
        }
    }
}
