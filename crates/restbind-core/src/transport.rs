//! The transport seam.
//!
//! The core never performs network I/O. Every dispatched call ends in one of
//! the four [`HttpTransport`] methods, and whatever that method returns is
//! handed back to the caller as is.

use std::fmt;

use serde_json::Value as JsonValue;

use crate::request::{HttpVerb, ResolvedRequest};

/// Capability that performs the actual HTTP call.
///
/// `Output` is usually a future (see [`crate::client::ApiClient`]); the core
/// neither awaits nor inspects it.
pub trait HttpTransport {
    type Output;

    fn get(&self, path: &str, query: &[(String, String)]) -> Self::Output;

    fn post(&self, path: &str, body: Option<&JsonValue>) -> Self::Output;

    fn put(&self, path: &str, body: Option<&JsonValue>) -> Self::Output;

    fn delete(&self, path: &str) -> Self::Output;
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    type Output = T::Output;

    fn get(&self, path: &str, query: &[(String, String)]) -> Self::Output {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        (**self).post(path, body)
    }

    fn put(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        (**self).put(path, body)
    }

    fn delete(&self, path: &str) -> Self::Output {
        (**self).delete(path)
    }
}

/// One argument of a dispatched call.
///
/// Values are opaque JSON; `JsonValue::Null` stands for an absent value.
pub enum CallArg<'a, T: ?Sized> {
    Transport(&'a T),
    Value(JsonValue),
}

impl<'a, T: ?Sized> CallArg<'a, T> {
    /// An absent value
    pub fn null() -> Self {
        Self::Value(JsonValue::Null)
    }

    pub fn value(value: impl Into<JsonValue>) -> Self {
        Self::Value(value.into())
    }

    pub fn as_value(&self) -> Option<&JsonValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::Transport(_) => None,
        }
    }

    pub fn as_transport(&self) -> Option<&'a T> {
        match self {
            Self::Transport(transport) => Some(*transport),
            Self::Value(_) => None,
        }
    }
}

impl<T: ?Sized> Clone for CallArg<'_, T> {
    fn clone(&self) -> Self {
        match self {
            Self::Transport(transport) => Self::Transport(*transport),
            Self::Value(value) => Self::Value(value.clone()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for CallArg<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(_) => f.write_str("Transport(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl<T: ?Sized> From<JsonValue> for CallArg<'_, T> {
    fn from(value: JsonValue) -> Self {
        Self::Value(value)
    }
}

/// Transport that sends nothing and hands back the request it was given.
///
/// Handy for previewing what a call would send.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl HttpTransport for DryRunTransport {
    type Output = ResolvedRequest;

    fn get(&self, path: &str, query: &[(String, String)]) -> Self::Output {
        ResolvedRequest {
            verb: HttpVerb::Get,
            path: path.to_string(),
            query: query.to_vec(),
            body: None,
        }
    }

    fn post(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        ResolvedRequest {
            verb: HttpVerb::Post,
            path: path.to_string(),
            query: Vec::new(),
            body: body.cloned(),
        }
    }

    fn put(&self, path: &str, body: Option<&JsonValue>) -> Self::Output {
        ResolvedRequest {
            verb: HttpVerb::Put,
            path: path.to_string(),
            query: Vec::new(),
            body: body.cloned(),
        }
    }

    fn delete(&self, path: &str) -> Self::Output {
        ResolvedRequest {
            verb: HttpVerb::Delete,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_arg_accessors() {
        let transport = DryRunTransport;
        let handle: CallArg<'_, DryRunTransport> = CallArg::Transport(&transport);
        assert!(handle.as_value().is_none());
        assert!(handle.as_transport().is_some());

        let value: CallArg<'_, DryRunTransport> = CallArg::value("42");
        assert_eq!(value.as_value(), Some(&json!("42")));
        assert!(value.as_transport().is_none());
        assert_eq!(format!("{:?}", CallArg::<DryRunTransport>::null()), "Value(Null)");
    }

    #[test]
    fn test_dry_run_echoes_request() {
        let request = DryRunTransport.put("/todos/1/done", Some(&json!({"done": true})));
        assert_eq!(request.verb, HttpVerb::Put);
        assert_eq!(request.path, "/todos/1/done");
        assert_eq!(request.body, Some(json!({"done": true})));
    }

    #[test]
    fn test_reference_forwards() {
        let transport = DryRunTransport;
        let by_ref = &transport;
        let request = HttpTransport::delete(&by_ref, "/todos/7");
        assert_eq!(request.verb, HttpVerb::Delete);
    }
}
