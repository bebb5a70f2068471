//! Request descriptors and the builder that resolves them against call
//! arguments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use url::form_urlencoded;

use crate::error::{Error, Result};
use crate::registry::{OperationBindings, OperationKey, ParameterRole};
use crate::template::PathTemplate;
use crate::transport::CallArg;

/// HTTP verb of a described operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpVerb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(Error::config(format!("unsupported HTTP verb '{}'", other))),
        }
    }
}

/// Verb and path template of one operation. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub verb: HttpVerb,
    pub template: PathTemplate,
}

impl RequestDescriptor {
    pub fn new(verb: HttpVerb, template: impl Into<String>) -> Self {
        Self {
            verb,
            template: PathTemplate::parse(template),
        }
    }
}

/// A fully resolved request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub verb: HttpVerb,
    pub path: String,
    /// Query pairs in binding order; absent values are omitted
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<JsonValue>,
}

impl ResolvedRequest {
    /// Percent-encoded query string without the leading `?`.
    pub fn query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish()
    }
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query_string())?;
        }
        if let Some(body) = &self.body {
            write!(f, " {}", body)?;
        }
        Ok(())
    }
}

/// String form of an argument value: strings without quotes, everything
/// else as JSON text.
pub fn display_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves a descriptor against one call's arguments.
///
/// Pure: no I/O and no shared state, so it may run concurrently for any
/// number of calls.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'k> {
    operation: &'k OperationKey,
}

impl<'k> RequestBuilder<'k> {
    pub fn new(operation: &'k OperationKey) -> Self {
        Self { operation }
    }

    pub fn build<T: ?Sized>(
        &self,
        descriptor: &RequestDescriptor,
        bindings: &OperationBindings,
        args: &[CallArg<'_, T>],
    ) -> Result<ResolvedRequest> {
        let mut values = Vec::with_capacity(bindings.paths.len());
        for binding in &bindings.paths {
            let role = || ParameterRole::PathParam(binding.name.clone());
            let value = self
                .value_at(args, binding.position, role)?
                .filter(|v| !v.is_null())
                .ok_or_else(|| Error::MissingArgument {
                    operation: self.operation.clone(),
                    position: binding.position,
                    role: role(),
                })?;
            values.push((binding.name.as_str(), display_value(value)));
        }
        let path = descriptor.template.substitute(&values);

        let mut query = Vec::with_capacity(bindings.queries.len());
        for binding in &bindings.queries {
            let role = || ParameterRole::QueryParam(binding.name.clone());
            match self.value_at(args, binding.position, role)? {
                None | Some(JsonValue::Null) => continue,
                Some(value) => query.push((binding.name.clone(), display_value(value))),
            }
        }

        let body = match bindings.body_position {
            Some(position) => self
                .value_at(args, position, || ParameterRole::Body)?
                .filter(|v| !v.is_null())
                .cloned(),
            None => None,
        };

        Ok(ResolvedRequest {
            verb: descriptor.verb,
            path,
            query,
            body,
        })
    }

    fn value_at<'v, T: ?Sized>(
        &self,
        args: &'v [CallArg<'_, T>],
        position: usize,
        role: impl FnOnce() -> ParameterRole,
    ) -> Result<Option<&'v JsonValue>> {
        match args.get(position) {
            None => Ok(None),
            Some(CallArg::Value(value)) => Ok(Some(value)),
            Some(CallArg::Transport(_)) => Err(Error::UnexpectedTransportHandle {
                operation: self.operation.clone(),
                position,
                role: role(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{PathBinding, QueryBinding};
    use crate::transport::DryRunTransport;
    use serde_json::json;

    type Arg<'a> = CallArg<'a, DryRunTransport>;

    fn key() -> OperationKey {
        OperationKey::new("TodoApi", "test")
    }

    fn query_bindings(names: &[(&str, usize)]) -> OperationBindings {
        OperationBindings {
            queries: names
                .iter()
                .map(|(name, position)| QueryBinding {
                    name: name.to_string(),
                    position: *position,
                })
                .collect(),
            transport_position: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_verb_parse_and_display() -> crate::Result<()> {
        assert_eq!("delete".parse::<HttpVerb>()?, HttpVerb::Delete);
        assert_eq!(HttpVerb::Post.to_string(), "POST");
        assert!("PATCH".parse::<HttpVerb>().is_err());
        Ok(())
    }

    #[test]
    fn test_path_substitution() -> crate::Result<()> {
        let descriptor = RequestDescriptor::new(HttpVerb::Get, "/todos/:id");
        let bindings = OperationBindings {
            paths: vec![PathBinding {
                name: "id".into(),
                position: 1,
            }],
            transport_position: Some(0),
            ..Default::default()
        };
        let transport = DryRunTransport;
        let args = [Arg::Transport(&transport), Arg::value("42")];
        let request = RequestBuilder::new(&key()).build(&descriptor, &bindings, &args)?;
        assert_eq!(request.path, "/todos/42");
        assert!(request.query.is_empty());
        assert_eq!(request.body, None);
        Ok(())
    }

    #[test]
    fn test_null_query_values_are_omitted() -> crate::Result<()> {
        let descriptor = RequestDescriptor::new(HttpVerb::Get, "/todos/list");
        let bindings = query_bindings(&[("done", 1), ("tag", 2), ("page", 3)]);
        let transport = DryRunTransport;
        let args = [
            Arg::Transport(&transport),
            Arg::value(true),
            Arg::null(),
            Arg::value(2),
        ];
        let request = RequestBuilder::new(&key()).build(&descriptor, &bindings, &args)?;
        assert_eq!(
            request.query,
            vec![
                ("done".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string())
            ]
        );
        Ok(())
    }

    #[test]
    fn test_missing_query_argument_is_omitted() -> crate::Result<()> {
        let descriptor = RequestDescriptor::new(HttpVerb::Get, "/todos/list");
        let bindings = query_bindings(&[("done", 1)]);
        let transport = DryRunTransport;
        let args = [Arg::Transport(&transport)];
        let request = RequestBuilder::new(&key()).build(&descriptor, &bindings, &args)?;
        assert!(request.query.is_empty());
        Ok(())
    }

    #[test]
    fn test_body_passes_through_unchanged() -> crate::Result<()> {
        let descriptor = RequestDescriptor::new(HttpVerb::Post, "/todos");
        let bindings = OperationBindings {
            body_position: Some(1),
            transport_position: Some(0),
            ..Default::default()
        };
        let transport = DryRunTransport;
        let body = json!({"name": "Example Todo", "tags": [1, null]});
        let args = [Arg::Transport(&transport), Arg::Value(body.clone())];
        let request = RequestBuilder::new(&key()).build(&descriptor, &bindings, &args)?;
        assert_eq!(request.body, Some(body));
        Ok(())
    }

    #[test]
    fn test_missing_path_argument_fails() {
        let descriptor = RequestDescriptor::new(HttpVerb::Get, "/todos/:id");
        let bindings = OperationBindings {
            paths: vec![PathBinding {
                name: "id".into(),
                position: 1,
            }],
            ..Default::default()
        };
        let args = [Arg::null()];
        let err = RequestBuilder::new(&key())
            .build(&descriptor, &bindings, &args)
            .unwrap_err();
        assert!(matches!(err, Error::MissingArgument { position: 1, .. }));
    }

    #[test]
    fn test_transport_in_value_position_fails() {
        let descriptor = RequestDescriptor::new(HttpVerb::Post, "/todos");
        let bindings = OperationBindings {
            body_position: Some(0),
            ..Default::default()
        };
        let transport = DryRunTransport;
        let args = [Arg::Transport(&transport)];
        let err = RequestBuilder::new(&key())
            .build(&descriptor, &bindings, &args)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedTransportHandle {
                role: ParameterRole::Body,
                ..
            }
        ));
    }

    #[test]
    fn test_repeated_builds_are_independent() -> crate::Result<()> {
        let descriptor = RequestDescriptor::new(HttpVerb::Get, "/todos/:id");
        let bindings = OperationBindings {
            paths: vec![PathBinding {
                name: "id".into(),
                position: 0,
            }],
            ..Default::default()
        };
        let key = key();
        let builder = RequestBuilder::new(&key);
        let first = builder.build(&descriptor, &bindings, &[Arg::value("1")])?;
        let second = builder.build(&descriptor, &bindings, &[Arg::value("2")])?;
        assert_eq!(first.path, "/todos/1");
        assert_eq!(second.path, "/todos/2");
        assert_eq!(descriptor.template.as_str(), "/todos/:id");
        Ok(())
    }

    #[test]
    fn test_display() {
        let request = ResolvedRequest {
            verb: HttpVerb::Get,
            path: "/todos/list".into(),
            query: vec![("q".into(), "a b".into()), ("done".into(), "true".into())],
            body: None,
        };
        assert_eq!(request.to_string(), "GET /todos/list?q=a+b&done=true");
    }
}
