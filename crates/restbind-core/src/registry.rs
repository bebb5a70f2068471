//! Parameter binding registry.
//!
//! Records, per described operation, which call argument position plays which
//! role. The registry is owned by an [`ApiDescription`](crate::api::ApiDescription)
//! and is only written while that description is being built.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Error, Result};

/// Identifies one described operation: the owning description and the
/// operation name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    api: String,
    operation: String,
}

impl OperationKey {
    pub fn new(api: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            operation: operation.into(),
        }
    }

    /// Name of the owning API description
    pub fn api(&self) -> &str {
        &self.api
    }

    /// Name of the operation within its description
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.api, self.operation)
    }
}

/// Role played by one call argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// Substituted into the path template for `:name`
    PathParam(String),
    /// Appended to the query string as `name=value`
    QueryParam(String),
    /// Sent as the request body
    Body,
    /// The transport that performs the call
    TransportHandle,
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathParam(name) => write!(f, "path parameter '{}'", name),
            Self::QueryParam(name) => write!(f, "query parameter '{}'", name),
            Self::Body => write!(f, "body"),
            Self::TransportHandle => write!(f, "transport handle"),
        }
    }
}

/// A path parameter bound to an argument position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathBinding {
    pub name: String,
    pub position: usize,
}

/// A query parameter bound to an argument position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBinding {
    pub name: String,
    pub position: usize,
}

/// All bindings recorded for one operation.
///
/// `paths` and `queries` keep registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationBindings {
    pub paths: Vec<PathBinding>,
    pub queries: Vec<QueryBinding>,
    pub body_position: Option<usize>,
    pub transport_position: Option<usize>,
}

#[derive(Debug, Default)]
struct OperationEntry {
    bindings: OperationBindings,
    roles: BTreeMap<usize, ParameterRole>,
}

/// Table of argument bindings keyed by operation.
#[derive(Debug, Default)]
pub struct ParameterBindingRegistry {
    operations: HashMap<OperationKey, OperationEntry>,
}

impl ParameterBindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `operation` has an entry, even if it never binds anything.
    pub fn declare(&mut self, operation: &OperationKey) {
        self.operations.entry(operation.clone()).or_default();
    }

    /// Bind `position` of `operation` to `role`.
    ///
    /// Path and query roles append. Body and transport roles replace the
    /// previous position for the operation. Binding a position that already
    /// holds a different role fails with [`Error::DuplicateBinding`].
    pub fn bind(
        &mut self,
        operation: &OperationKey,
        position: usize,
        role: ParameterRole,
    ) -> Result<()> {
        if let Some(existing) = self
            .operations
            .get(operation)
            .and_then(|entry| entry.roles.get(&position))
        {
            if *existing != role {
                return Err(Error::DuplicateBinding {
                    operation: operation.clone(),
                    position,
                    existing: existing.clone(),
                    requested: role,
                });
            }
        }

        let entry = self.operations.entry(operation.clone()).or_default();
        let previous = match &role {
            ParameterRole::PathParam(name) => {
                entry.bindings.paths.push(PathBinding {
                    name: name.clone(),
                    position,
                });
                None
            }
            ParameterRole::QueryParam(name) => {
                entry.bindings.queries.push(QueryBinding {
                    name: name.clone(),
                    position,
                });
                None
            }
            ParameterRole::Body => entry.bindings.body_position.replace(position),
            ParameterRole::TransportHandle => {
                entry.bindings.transport_position.replace(position)
            }
        };
        if let Some(previous) = previous.filter(|p| *p != position) {
            entry.roles.remove(&previous);
        }
        log::trace!("bound {} argument {} as {}", operation, position, role);
        entry.roles.insert(position, role);
        Ok(())
    }

    /// Bindings recorded for `operation`, if it was declared or bound.
    pub fn bindings_for(&self, operation: &OperationKey) -> Option<&OperationBindings> {
        self.operations.get(operation).map(|entry| &entry.bindings)
    }

    /// Role currently held by `position` of `operation`.
    pub fn role_at(&self, operation: &OperationKey, position: usize) -> Option<&ParameterRole> {
        self.operations
            .get(operation)
            .and_then(|entry| entry.roles.get(&position))
    }

    /// Every bound position of `operation` with its role, by position.
    pub fn roles<'a>(
        &'a self,
        operation: &OperationKey,
    ) -> impl Iterator<Item = (usize, &'a ParameterRole)> + 'a {
        self.operations
            .get(operation)
            .into_iter()
            .flat_map(|entry| entry.roles.iter().map(|(position, role)| (*position, role)))
    }

    /// Drop everything recorded for `operation`.
    pub(crate) fn remove(&mut self, operation: &OperationKey) {
        self.operations.remove(operation);
    }
}
