//! Error types.
//!
//! [`Error`] is what resolvers and coercion produce: a message plus
//! optional machine-readable extensions. [`ServerError`] is the located
//! form that ends up in a response, carrying source positions and the
//! response path of the failing field.

use std::{
    any::Any,
    collections::BTreeMap,
    fmt::{self, Debug, Display, Formatter},
    sync::Arc,
};

use engine_value::ConstValue;
use serde::{Deserialize, Serialize};

use crate::{ast::Pos, query_path::QueryPathSegment};

/// Alias for `Result<T, ServerError>`.
pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// An error in a response, with the source locations and response path the
/// wire format calls for.
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// The error message.
    pub message: String,
    /// The value this error was built from, if any. Not serialized.
    #[serde(skip)]
    pub source: Option<Arc<dyn Any + Send + Sync>>,
    /// Source positions the error refers to.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Pos>,
    /// Path from the response root to the failing field.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<QueryPathSegment>,
    /// Extensions to the error.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub extensions: Option<ErrorExtensionValues>,
}

impl ServerError {
    /// Create an error from a message and an optional position.
    pub fn new(message: impl Into<String>, pos: Option<Pos>) -> Self {
        ServerError {
            message: message.into(),
            source: None,
            locations: pos.into_iter().collect(),
            path: Vec::new(),
            extensions: None,
        }
    }

    /// Attach a response path, replacing any existing one.
    #[must_use]
    pub fn with_path(mut self, path: Vec<QueryPathSegment>) -> Self {
        self.path = path;
        self
    }
}

impl Debug for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerError")
            .field("message", &self.message)
            .field("locations", &self.locations)
            .field("path", &self.path)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ServerError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.locations == other.locations
            && self.path == other.path
            && self.extensions == other.extensions
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ServerError> for Vec<ServerError> {
    fn from(error: ServerError) -> Self {
        vec![error]
    }
}

/// Extension values attached to an error, serialized under `extensions`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorExtensionValues(pub BTreeMap<String, ConstValue>);

impl ErrorExtensionValues {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ConstValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An error produced while resolving or coercing a value, before it has
/// been located in the document.
#[derive(Clone, Serialize)]
pub struct Error {
    /// The error message.
    pub message: String,
    /// The source of the error. Not serialized.
    #[serde(skip)]
    pub source: Option<Arc<dyn Any + Send + Sync>>,
    /// Extensions to the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ErrorExtensionValues>,
}

impl Error {
    /// Create an error from the given error message.
    pub fn new(message: impl Into<String>) -> Self {
        Error {
            message: message.into(),
            source: None,
            extensions: None,
        }
    }

    /// Create an error from a displayable source value, keeping the value
    /// around for downcasting.
    pub fn new_with_source(source: impl Display + Send + Sync + 'static) -> Self {
        Error {
            message: source.to_string(),
            source: Some(Arc::new(source)),
            extensions: None,
        }
    }

    /// Locate the error at a position, producing a [`ServerError`].
    #[must_use]
    pub fn into_server_error(self, pos: Pos) -> ServerError {
        ServerError {
            message: self.message,
            source: self.source,
            locations: vec![pos],
            path: Vec::new(),
            extensions: self.extensions,
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("message", &self.message)
            .field("extensions", &self.extensions)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.extensions == other.extensions
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<ServerError> for Error {
    fn from(error: ServerError) -> Self {
        Error {
            message: error.message,
            source: error.source,
            extensions: error.extensions,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::new(error.to_string())
    }
}

/// An alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
