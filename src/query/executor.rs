use http::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::query::types::{QueryError, QueryRequest, QueryResult, Variables};
use crate::session::session::Session;
use crate::utils::constants::GRAPHQL_ROUTE;

impl Session {
    /// Run a query with the current token.
    ///
    /// Never fails: transport, status and parse problems come back as a single
    /// entry in [`QueryResult::Errors`]. The session lock is held until the
    /// response body is read, so a renewal cannot swap the token mid-query.
    pub async fn execute(&self, query: &str, variables: Variables) -> QueryResult {
        let state = self.lock().await;

        let response = self
            .http()
            .post(self.url(GRAPHQL_ROUTE))
            .bearer_auth(state.raw())
            .header(CONTENT_TYPE, "application/json")
            .json(&QueryRequest {
                query,
                variables: &variables,
            })
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "graphql request failed");
                return QueryResult::error(format!("request failed: {}", e));
            }
        };

        let status = response.status();
        let result = match response.text().await {
            Ok(body) => parse_response(status, &body),
            Err(e) => QueryResult::error(format!("failed to read response body: {}", e)),
        };
        drop(state);

        if result.has_errors() {
            debug!(errors = result.errors().len(), "query returned errors");
        }
        result
    }
}

/// Map a GraphQL HTTP response onto a [`QueryResult`].
///
/// `errors` wins over `data` when both are present.
pub fn parse_response(status: StatusCode, body: &str) -> QueryResult {
    if !status.is_success() {
        return QueryResult::error(format!("unexpected status code: {}", status.as_u16()));
    }

    let mut envelope = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return QueryResult::error("response body is not a JSON object"),
        Err(e) => return QueryResult::error(format!("failed to parse response body: {}", e)),
    };

    match envelope.remove("errors") {
        Some(Value::Array(items)) if !items.is_empty() => {
            return QueryResult::Errors(items.into_iter().map(QueryError::from_value).collect())
        }
        None | Some(Value::Null) | Some(Value::Array(_)) => {}
        Some(other) => return QueryResult::error(format!("malformed 'errors' field: {}", other)),
    }

    match envelope.remove("data") {
        None | Some(Value::Null) => QueryResult::Data(Map::new()),
        Some(Value::Object(data)) => QueryResult::Data(data),
        Some(other) => QueryResult::error(format!("malformed 'data' field: {}", other)),
    }
}
