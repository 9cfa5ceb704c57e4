use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Query variables: name -> arbitrary JSON value
pub type Variables = Map<String, Value>;

/// Body posted to the GraphQL route
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub variables: &'a Variables,
}

/// One query-level failure
#[derive(Debug, Clone, PartialEq)]
pub struct QueryError {
    pub message: String,
    pub path: Option<Value>,
    pub extensions: Option<Value>,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }

    /// Build from one element of a response `errors` array.
    ///
    /// The standard envelope carries `message` directly on the element. Some
    /// issuer versions nest it as `errors.message`; that shape is read as a
    /// fallback. Anything else keeps the element's JSON text as the message.
    pub fn from_value(value: Value) -> Self {
        let message = match &value {
            Value::String(s) => s.to_owned(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| {
                    map.get("errors")
                        .and_then(|nested| nested.get("message"))
                        .and_then(Value::as_str)
                })
                .map(str::to_owned)
                .unwrap_or_else(|| value.to_string()),
            other => other.to_string(),
        };

        Self {
            message,
            path: value.get("path").cloned(),
            extensions: value.get("extensions").cloned(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a query: either data or a non-empty list of errors, never both.
///
/// An empty `Data` map is a valid "no data" success.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Data(Map<String, Value>),
    Errors(Vec<QueryError>),
}

impl QueryResult {
    pub(crate) fn error(message: impl Into<String>) -> Self {
        QueryResult::Errors(vec![QueryError::new(message)])
    }

    pub fn has_errors(&self) -> bool {
        matches!(self, QueryResult::Errors(_))
    }

    pub fn data(&self) -> Option<&Map<String, Value>> {
        match self {
            QueryResult::Data(data) => Some(data),
            QueryResult::Errors(_) => None,
        }
    }

    /// Errors in response order; empty on success
    pub fn errors(&self) -> &[QueryError] {
        match self {
            QueryResult::Data(_) => &[],
            QueryResult::Errors(errors) => errors,
        }
    }

    pub fn into_result(self) -> Result<Map<String, Value>, Vec<QueryError>> {
        match self {
            QueryResult::Data(data) => Ok(data),
            QueryResult::Errors(errors) => Err(errors),
        }
    }
}
