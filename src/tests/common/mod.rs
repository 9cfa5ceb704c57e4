// shared helpers for the async integration tests
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use httpmock::Method::GET;
use httpmock::MockServer;
use reqwest::Client;
use serde_json::{json, Value};

use crate::helpers::time::now_i64;
use crate::session::{Credential, Session};
use crate::utils::constants::TOKEN_ROUTE;

pub const CREDENTIAL: &str = "abc123";

/// Unsigned JWT-shaped token carrying `claims`
pub fn jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, payload)
}

pub fn claims(sub: &str, iat: i64, exp: i64) -> Value {
    json!({
        "sub": sub,
        "iat": iat,
        "exp": exp,
        "ip": "10.11.12.13",
        "x-hasura-campuses": {"1": "paris"},
        "https://hasura.io/jwt/claims": {
            "x-hasura-allowed-roles": ["user"],
            "x-hasura-default-role": "user",
            "x-hasura-user-id": sub
        }
    })
}

/// Claims for a token that is still valid for `ttl` seconds
pub fn fresh_claims(sub: &str, ttl: i64) -> Value {
    let now = now_i64();
    claims(sub, now - 60, now + ttl)
}

/// Claims for a token that expired a while ago
pub fn expired_claims(sub: &str) -> Value {
    claims(sub, 1700000000, 1700003600)
}

/// The issuer's token routes answer with a quoted JSON string
pub fn quoted(raw: &str) -> String {
    format!("\"{}\"", raw)
}

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Session established against `server` whose token route hands out `raw`
pub async fn established_session(server: &MockServer, raw: &str) -> Arc<Session> {
    let body = quoted(raw);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(TOKEN_ROUTE)
                .query_param("token", CREDENTIAL);
            then.status(200)
                .header("Content-Type", "application/json")
                .body(body.as_str());
        })
        .await;

    let session = Session::establish(
        &server.base_url(),
        Credential::new(CREDENTIAL),
        build_reqwest_client(),
    )
    .await
    .expect("session established");
    Arc::new(session)
}
