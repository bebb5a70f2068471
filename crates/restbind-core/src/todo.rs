//! The Todo API, described with the registration builder.
//!
//! Every operation takes its transport as argument 0. The typed methods only
//! assemble arguments; the request itself comes from the shared dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::api::ApiDescription;
use crate::error::Result;
use crate::request::HttpVerb;
use crate::transport::{CallArg, HttpTransport};

/// A todo item as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    pub name: String,
}

#[derive(Debug)]
pub struct TodoApi {
    description: ApiDescription,
}

impl TodoApi {
    pub const NAME: &'static str = "TodoApi";

    pub fn new() -> Result<Self> {
        let mut api = ApiDescription::new(Self::NAME);
        api.describe("list", HttpVerb::Get, "/todos/list")
            .transport(0)
            .query_param("done", 1)
            .register()?;
        api.describe("todo", HttpVerb::Get, "/todos/:id")
            .transport(0)
            .path_param("id", 1)
            .register()?;
        api.describe("create", HttpVerb::Post, "/todos")
            .transport(0)
            .body(1)
            .register()?;
        api.describe("done", HttpVerb::Put, "/todos/:id/done")
            .transport(0)
            .path_param("id", 1)
            .register()?;
        api.describe("delete", HttpVerb::Delete, "/todos/:id")
            .transport(0)
            .path_param("id", 1)
            .register()?;
        Ok(Self { description: api })
    }

    pub fn description(&self) -> &ApiDescription {
        &self.description
    }

    pub fn into_description(self) -> ApiDescription {
        self.description
    }

    /// `GET /todos/list`, filtered by `done` when given
    pub fn list<T: HttpTransport + ?Sized>(&self, client: &T, done: Option<bool>) -> Result<T::Output> {
        self.description
            .call("list", &[CallArg::Transport(client), CallArg::value(done)])
    }

    /// `GET /todos/:id`
    pub fn todo<T: HttpTransport + ?Sized>(&self, client: &T, id: &str) -> Result<T::Output> {
        self.description
            .call("todo", &[CallArg::Transport(client), CallArg::value(id)])
    }

    /// `POST /todos`
    pub fn create<T: HttpTransport + ?Sized>(&self, client: &T, body: &NewTodo) -> Result<T::Output> {
        let body: JsonValue = serde_json::to_value(body)?;
        self.description
            .call("create", &[CallArg::Transport(client), CallArg::Value(body)])
    }

    /// `PUT /todos/:id/done`
    pub fn done<T: HttpTransport + ?Sized>(&self, client: &T, id: &str) -> Result<T::Output> {
        self.description
            .call("done", &[CallArg::Transport(client), CallArg::value(id)])
    }

    /// `DELETE /todos/:id`
    pub fn delete<T: HttpTransport + ?Sized>(&self, client: &T, id: &str) -> Result<T::Output> {
        self.description
            .call("delete", &[CallArg::Transport(client), CallArg::value(id)])
    }
}
