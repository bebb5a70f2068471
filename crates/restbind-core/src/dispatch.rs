//! Per-operation dispatch.
//!
//! A [`Dispatcher`] is the body of a described operation. Invoking it looks up
//! the operation's bindings, takes the transport handle out of the arguments,
//! resolves the request and forwards it to the transport. The transport's
//! output is returned without being awaited or inspected.

use crate::error::{Error, Result};
use crate::registry::{OperationBindings, OperationKey, ParameterBindingRegistry};
use crate::request::{HttpVerb, RequestBuilder, RequestDescriptor, ResolvedRequest};
use crate::transport::{CallArg, HttpTransport};

/// Callable for one described operation.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a> {
    key: &'a OperationKey,
    descriptor: &'a RequestDescriptor,
    registry: &'a ParameterBindingRegistry,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        key: &'a OperationKey,
        descriptor: &'a RequestDescriptor,
        registry: &'a ParameterBindingRegistry,
    ) -> Self {
        Self {
            key,
            descriptor,
            registry,
        }
    }

    pub fn key(&self) -> &'a OperationKey {
        self.key
    }

    pub fn descriptor(&self) -> &'a RequestDescriptor {
        self.descriptor
    }

    pub fn bindings(&self) -> Result<&'a OperationBindings> {
        self.registry
            .bindings_for(self.key)
            .ok_or_else(|| Error::UnknownOperation(self.key.clone()))
    }

    /// Resolve the request for `args` without touching any transport.
    pub fn resolve<T: ?Sized>(&self, args: &[CallArg<'_, T>]) -> Result<ResolvedRequest> {
        let bindings = self.bindings()?;
        RequestBuilder::new(self.key).build(self.descriptor, bindings, args)
    }

    /// Run the operation: every check happens before the transport is called.
    pub fn invoke<T: HttpTransport + ?Sized>(&self, args: &[CallArg<'_, T>]) -> Result<T::Output> {
        let bindings = self.bindings()?;
        let transport = bindings
            .transport_position
            .and_then(|position| args.get(position))
            .and_then(CallArg::as_transport)
            .ok_or_else(|| Error::MissingTransportHandle {
                operation: self.key.clone(),
            })?;
        let request = RequestBuilder::new(self.key).build(self.descriptor, bindings, args)?;
        log::debug!("dispatching {}: {}", self.key, request);
        Ok(forward(transport, &request))
    }
}

fn forward<T: HttpTransport + ?Sized>(transport: &T, request: &ResolvedRequest) -> T::Output {
    match request.verb {
        HttpVerb::Get => transport.get(&request.path, &request.query),
        HttpVerb::Post => transport.post(&request.path, request.body.as_ref()),
        HttpVerb::Put => transport.put(&request.path, request.body.as_ref()),
        HttpVerb::Delete => transport.delete(&request.path),
    }
}
