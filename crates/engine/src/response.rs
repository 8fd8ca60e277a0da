//! The response to an executed operation.

use engine_value::ConstValue;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;

/// A GraphQL response.
///
/// `errors` is serialized only when non-empty. `data` is absent when the
/// request failed before any field executed (unknown operation, variable
/// coercion failure, missing root type), and `null` when a root-level
/// non-null field error propagated all the way up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ServerError>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<ConstValue>,
}

impl Response {
    /// A successful response carrying data.
    pub fn new(data: ConstValue) -> Self {
        Response {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A pre-execution failure: errors only, no `data` key at all.
    pub fn from_errors(errors: impl Into<Vec<ServerError>>) -> Self {
        Response {
            data: None,
            errors: errors.into(),
        }
    }

    /// True when no error was recorded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Serialize into a JSON value, mostly for tests and snapshots.
    pub fn into_value(self) -> serde_json::Value {
        serde_json::to_value(self).expect("a response always serializes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_key_absent_on_request_errors() {
        let response = Response::from_errors(ServerError::new("bad request", None));
        assert_eq!(
            response.into_value(),
            json!({"errors": [{"message": "bad request"}]})
        );
    }

    #[test]
    fn null_data_survives_serialization() {
        let mut response = Response::new(ConstValue::Null);
        response.errors.push(ServerError::new("boom", None));
        assert_eq!(
            response.into_value(),
            json!({"errors": [{"message": "boom"}], "data": null})
        );
    }
}
