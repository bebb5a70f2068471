//! restbind Core Library
//!
//! This library turns declarative API descriptions (verb, path template and
//! the role of every call argument) into fully formed HTTP requests, and hands
//! them to a pluggable transport.

pub mod api;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod request;
pub mod template;
pub mod todo;
pub mod transport;

pub use crate::{
    api::{ApiDescription, OperationBuilder, UnresolvedTokenPolicy},
    client::{ApiClient, ApiResponse, TransportError},
    config::Config,
    dispatch::Dispatcher,
    error::{Error, Result},
    manifest::ApiManifest,
    registry::{OperationBindings, OperationKey, ParameterBindingRegistry, ParameterRole},
    request::{HttpVerb, RequestBuilder, RequestDescriptor, ResolvedRequest},
    template::PathTemplate,
    todo::{NewTodo, Todo, TodoApi},
    transport::{CallArg, DryRunTransport, HttpTransport},
};
