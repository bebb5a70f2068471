//! Error handling for the restbind library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias. Registration problems
//! (duplicate roles, unresolved path tokens) surface while an API description
//! is being built; dispatch problems surface before the transport is touched.
//!
//! Failures of the transport itself are not represented here. They travel
//! inside whatever the transport returns, see [`crate::client::TransportError`].
//!
//! # Examples
//!
//! ```
//! use restbind_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("base_url is required"))
//! }
//!
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

use crate::registry::{OperationKey, ParameterRole};

/// Result type for restbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for restbind operations
#[derive(Debug, Error)]
pub enum Error {
    /// No argument position is bound as the transport handle, or the bound
    /// argument does not hold one
    #[error("operation {operation} has no transport handle")]
    MissingTransportHandle { operation: OperationKey },

    /// A path template token has no matching path binding
    #[error("operation {operation}: path token ':{token}' has no binding")]
    UnresolvedPathToken {
        operation: OperationKey,
        token: String,
    },

    /// Two different roles were registered for one argument position
    #[error(
        "operation {operation}: argument {position} is already bound as {existing}, cannot rebind as {requested}"
    )]
    DuplicateBinding {
        operation: OperationKey,
        position: usize,
        existing: ParameterRole,
        requested: ParameterRole,
    },

    /// The same operation name was described twice
    #[error("operation {0} is already described")]
    DuplicateOperation(OperationKey),

    /// No operation with the given name was described
    #[error("operation {0} is not described")]
    UnknownOperation(OperationKey),

    /// A bound argument position was not supplied by the caller
    #[error("operation {operation}: argument {position} ({role}) was not supplied")]
    MissingArgument {
        operation: OperationKey,
        position: usize,
        role: ParameterRole,
    },

    /// A transport handle was supplied where a value was expected
    #[error("operation {operation}: argument {position} ({role}) holds a transport handle, expected a value")]
    UnexpectedTransportHandle {
        operation: OperationKey,
        position: usize,
        role: ParameterRole,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was raised while an API description was being built
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedPathToken { .. }
                | Self::DuplicateBinding { .. }
                | Self::DuplicateOperation(_)
        )
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Config(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Config(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_binding_message() {
        let err = Error::DuplicateBinding {
            operation: OperationKey::new("TodoApi", "todo"),
            position: 1,
            existing: ParameterRole::PathParam("id".into()),
            requested: ParameterRole::Body,
        };
        assert_eq!(
            err.to_string(),
            "operation TodoApi::todo: argument 1 is already bound as path parameter 'id', cannot rebind as body"
        );
        assert!(err.is_registration_error());
    }

    #[test]
    fn test_missing_transport_is_not_registration_error() {
        let err = Error::MissingTransportHandle {
            operation: OperationKey::new("TodoApi", "list"),
        };
        assert!(!err.is_registration_error());
        assert_eq!(err.to_string(), "operation TodoApi::list has no transport handle");
    }

    #[test]
    fn test_from_str_is_config() {
        let err: Error = "bad".into();
        assert!(matches!(err, Error::Config(ref m) if m == "bad"));
    }
}
