//! API descriptions.
//!
//! An [`ApiDescription`] owns the request descriptors and the binding registry
//! of one API surface. Operations are described with an explicit builder and
//! dispatched through [`Dispatcher`] values borrowed from the description.
//!
//! Building needs `&mut ApiDescription` and dispatching needs
//! `&ApiDescription`, so registration always completes before the first call.
//!
//! # Examples
//!
//! ```
//! use restbind_core::api::ApiDescription;
//! use restbind_core::request::HttpVerb;
//! use restbind_core::transport::{CallArg, DryRunTransport};
//!
//! # fn main() -> restbind_core::Result<()> {
//! let mut api = ApiDescription::new("TodoApi");
//! api.describe("todo", HttpVerb::Get, "/todos/:id")
//!     .transport(0)
//!     .path_param("id", 1)
//!     .register()?;
//!
//! let transport = DryRunTransport;
//! let request = api
//!     .operation("todo")?
//!     .invoke(&[CallArg::Transport(&transport), CallArg::value("42")])?;
//! assert_eq!(request.path, "/todos/42");
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::registry::{OperationKey, ParameterBindingRegistry, ParameterRole};
use crate::request::{HttpVerb, RequestDescriptor};
use crate::transport::{CallArg, HttpTransport};

/// What to do with a path token that no path parameter is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedTokenPolicy {
    /// Fail the registration with [`Error::UnresolvedPathToken`]
    #[default]
    Reject,
    /// Leave the literal `:token` in the resolved path
    PassThrough,
}

#[derive(Debug)]
struct DescribedOperation {
    key: OperationKey,
    descriptor: RequestDescriptor,
}

/// A described API surface.
#[derive(Debug)]
pub struct ApiDescription {
    name: String,
    policy: UnresolvedTokenPolicy,
    registry: ParameterBindingRegistry,
    operations: Vec<DescribedOperation>,
    index: HashMap<String, usize>,
}

impl ApiDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_policy(name, UnresolvedTokenPolicy::default())
    }

    pub fn with_policy(name: impl Into<String>, policy: UnresolvedTokenPolicy) -> Self {
        Self {
            name: name.into(),
            policy,
            registry: ParameterBindingRegistry::new(),
            operations: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> UnresolvedTokenPolicy {
        self.policy
    }

    pub fn registry(&self) -> &ParameterBindingRegistry {
        &self.registry
    }

    /// Start describing `operation`. Nothing is recorded until
    /// [`OperationBuilder::register`] is called.
    pub fn describe(
        &mut self,
        operation: impl Into<String>,
        verb: HttpVerb,
        template: impl Into<String>,
    ) -> OperationBuilder<'_> {
        OperationBuilder {
            api: self,
            name: operation.into(),
            descriptor: RequestDescriptor::new(verb, template),
            bindings: Vec::new(),
        }
    }

    /// The dispatcher for a described operation.
    pub fn operation(&self, name: &str) -> Result<Dispatcher<'_>> {
        let described = self
            .index
            .get(name)
            .map(|&i| &self.operations[i])
            .ok_or_else(|| Error::UnknownOperation(OperationKey::new(&self.name, name)))?;
        Ok(Dispatcher::new(
            &described.key,
            &described.descriptor,
            &self.registry,
        ))
    }

    /// Shorthand for `self.operation(name)?.invoke(args)`.
    pub fn call<T: HttpTransport + ?Sized>(
        &self,
        name: &str,
        args: &[CallArg<'_, T>],
    ) -> Result<T::Output> {
        self.operation(name)?.invoke(args)
    }

    /// Described operations in registration order.
    pub fn operations(&self) -> impl Iterator<Item = (&OperationKey, &RequestDescriptor)> + '_ {
        self.operations.iter().map(|op| (&op.key, &op.descriptor))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Collects the bindings of one operation until it is registered.
#[derive(Debug)]
#[must_use = "an operation is only described once `register` is called"]
pub struct OperationBuilder<'a> {
    api: &'a mut ApiDescription,
    name: String,
    descriptor: RequestDescriptor,
    bindings: Vec<(usize, ParameterRole)>,
}

impl OperationBuilder<'_> {
    pub fn path_param(self, name: impl Into<String>, position: usize) -> Self {
        self.bind(position, ParameterRole::PathParam(name.into()))
    }

    pub fn query_param(self, name: impl Into<String>, position: usize) -> Self {
        self.bind(position, ParameterRole::QueryParam(name.into()))
    }

    pub fn body(self, position: usize) -> Self {
        self.bind(position, ParameterRole::Body)
    }

    pub fn transport(self, position: usize) -> Self {
        self.bind(position, ParameterRole::TransportHandle)
    }

    pub fn bind(mut self, position: usize, role: ParameterRole) -> Self {
        self.bindings.push((position, role));
        self
    }

    /// Record the operation. Fails fast on duplicate roles, on a second
    /// description of the same name and, under
    /// [`UnresolvedTokenPolicy::Reject`], on unbound path tokens. A failed
    /// registration leaves the description unchanged.
    pub fn register(self) -> Result<()> {
        let Self {
            api,
            name,
            descriptor,
            bindings,
        } = self;
        let key = OperationKey::new(&api.name, &name);
        if api.index.contains_key(&name) {
            return Err(Error::DuplicateOperation(key));
        }

        api.registry.declare(&key);
        if let Err(e) = apply(&mut api.registry, api.policy, &key, &descriptor, bindings) {
            api.registry.remove(&key);
            return Err(e);
        }

        log::debug!(
            "registered {} as {} {}",
            key,
            descriptor.verb,
            descriptor.template
        );
        api.index.insert(name, api.operations.len());
        api.operations.push(DescribedOperation { key, descriptor });
        Ok(())
    }
}

fn apply(
    registry: &mut ParameterBindingRegistry,
    policy: UnresolvedTokenPolicy,
    key: &OperationKey,
    descriptor: &RequestDescriptor,
    bindings: Vec<(usize, ParameterRole)>,
) -> Result<()> {
    for (position, role) in bindings {
        registry.bind(key, position, role)?;
    }

    let Some(recorded) = registry.bindings_for(key) else {
        return Err(Error::UnknownOperation(key.clone()));
    };
    for token in descriptor.template.tokens() {
        if recorded.paths.iter().any(|p| &p.name == token) {
            continue;
        }
        match policy {
            UnresolvedTokenPolicy::Reject => {
                return Err(Error::UnresolvedPathToken {
                    operation: key.clone(),
                    token: token.clone(),
                })
            }
            UnresolvedTokenPolicy::PassThrough => {
                log::warn!("{}: path token ':{}' has no binding", key, token)
            }
        }
    }
    for binding in &recorded.paths {
        if !descriptor.template.tokens().contains(&binding.name) {
            log::warn!(
                "{}: path parameter '{}' does not appear in {}",
                key,
                binding.name,
                descriptor.template
            );
        }
    }
    if recorded.transport_position.is_none() {
        log::warn!("{} has no transport handle bound", key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ResolvedRequest;
    use crate::transport::DryRunTransport;
    use serde_json::json;

    type Arg<'a> = CallArg<'a, DryRunTransport>;

    #[test]
    fn test_describe_and_dispatch() -> crate::Result<()> {
        let mut api = ApiDescription::new("TodoApi");
        api.describe("list", HttpVerb::Get, "/todos/list")
            .transport(0)
            .query_param("done", 1)
            .register()?;

        let transport = DryRunTransport;
        let request: ResolvedRequest =
            api.call("list", &[Arg::Transport(&transport), Arg::value(false)])?;
        assert_eq!(request.query, vec![("done".to_string(), "false".to_string())]);
        Ok(())
    }

    #[test]
    fn test_unknown_operation() {
        let api = ApiDescription::new("TodoApi");
        let err = api.operation("missing").unwrap_err();
        assert!(matches!(err, Error::UnknownOperation(ref key) if key.operation() == "missing"));
    }

    #[test]
    fn test_duplicate_operation_is_rejected() -> crate::Result<()> {
        let mut api = ApiDescription::new("TodoApi");
        api.describe("list", HttpVerb::Get, "/todos/list")
            .transport(0)
            .register()?;
        let err = api
            .describe("list", HttpVerb::Post, "/todos")
            .transport(0)
            .register()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateOperation(_)));
        assert_eq!(api.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_binding_fails_at_registration() {
        let mut api = ApiDescription::new("TodoApi");
        let err = api
            .describe("todo", HttpVerb::Get, "/todos/:id")
            .transport(0)
            .path_param("id", 1)
            .body(1)
            .register()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateBinding { position: 1, .. }));
        assert!(api.is_empty());
        assert!(api
            .registry()
            .bindings_for(&OperationKey::new("TodoApi", "todo"))
            .is_none());
    }

    #[test]
    fn test_unresolved_token_rejected_by_default() {
        let mut api = ApiDescription::new("TodoApi");
        let err = api
            .describe("todo", HttpVerb::Get, "/todos/:id")
            .transport(0)
            .register()
            .unwrap_err();
        assert!(matches!(err, Error::UnresolvedPathToken { ref token, .. } if token == "id"));
    }

    #[test]
    fn test_unresolved_token_pass_through() -> crate::Result<()> {
        let mut api = ApiDescription::with_policy("TodoApi", UnresolvedTokenPolicy::PassThrough);
        api.describe("done", HttpVerb::Put, "/users/:user/todos/:id/done")
            .transport(0)
            .path_param("id", 1)
            .register()?;

        let transport = DryRunTransport;
        let request = api.call("done", &[Arg::Transport(&transport), Arg::value(3)])?;
        assert_eq!(request.path, "/users/:user/todos/3/done");
        Ok(())
    }

    #[test]
    fn test_missing_transport_binding_fails_at_call_time() -> crate::Result<()> {
        let mut api = ApiDescription::new("TodoApi");
        api.describe("create", HttpVerb::Post, "/todos")
            .body(0)
            .register()?;

        let err = api
            .call("create", &[Arg::value(json!({"name": "x"}))])
            .unwrap_err();
        assert!(matches!(err, Error::MissingTransportHandle { .. }));
        Ok(())
    }

    #[test]
    fn test_transport_position_holding_value_fails() -> crate::Result<()> {
        let mut api = ApiDescription::new("TodoApi");
        api.describe("list", HttpVerb::Get, "/todos/list")
            .transport(0)
            .register()?;
        let err = api.call("list", &[Arg::value("not a transport")]).unwrap_err();
        assert!(matches!(err, Error::MissingTransportHandle { .. }));
        let err = api.call::<DryRunTransport>("list", &[]).unwrap_err();
        assert!(matches!(err, Error::MissingTransportHandle { .. }));
        Ok(())
    }

    #[test]
    fn test_descriptions_do_not_share_bindings() -> crate::Result<()> {
        let mut first = ApiDescription::new("TodoApi");
        let mut second = ApiDescription::new("TodoApi");
        first
            .describe("todo", HttpVerb::Get, "/todos/:id")
            .transport(0)
            .path_param("id", 1)
            .register()?;
        second
            .describe("todo", HttpVerb::Get, "/todos/:id")
            .transport(1)
            .path_param("id", 0)
            .register()?;

        let transport = DryRunTransport;
        let a = first.call("todo", &[Arg::Transport(&transport), Arg::value("a")])?;
        let b = second.call("todo", &[Arg::value("b"), Arg::Transport(&transport)])?;
        assert_eq!(a.path, "/todos/a");
        assert_eq!(b.path, "/todos/b");
        Ok(())
    }

    #[test]
    fn test_operations_keep_registration_order() -> crate::Result<()> {
        let mut api = ApiDescription::new("TodoApi");
        for name in ["c", "a", "b"] {
            api.describe(name, HttpVerb::Get, "/x").transport(0).register()?;
        }
        let names: Vec<_> = api.operations().map(|(key, _)| key.operation()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        Ok(())
    }

    #[test]
    fn test_policy_serde_names() -> crate::Result<()> {
        let policy: UnresolvedTokenPolicy = serde_json::from_str("\"pass_through\"")?;
        assert_eq!(policy, UnresolvedTokenPolicy::PassThrough);
        Ok(())
    }
}
