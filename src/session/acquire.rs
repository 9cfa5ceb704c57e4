use reqwest::Client;
use tracing::{debug, error};

use crate::errors::AcquisitionError;
use crate::session::session::Credential;
use crate::token::claims::Token;
use crate::token::codec;
use crate::utils::constants::{TOKEN_QUERY_PARAM, TOKEN_ROUTE};

/// Exchange the opaque credential for a first bearer token.
///
/// `GET {base_url}/api/auth/token?token={credential}`, answered with the
/// token as a JSON string.
pub async fn acquire(
    client: &Client,
    base_url: &str,
    credential: &Credential,
) -> Result<(String, Token), AcquisitionError> {
    let url = format!("{}{}", base_url, TOKEN_ROUTE);
    debug!(url = %url, "requesting token");

    let response = client
        .get(&url)
        .query(&[(TOKEN_QUERY_PARAM, credential.expose())])
        .send()
        .await
        .map_err(|e| {
            error!(error = %e, "token request failed");
            AcquisitionError::Network(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AcquisitionError::BadResponse(format!(
            "HTTP request failed: {}",
            status
        )));
    }

    let body = response.text().await.map_err(AcquisitionError::Network)?;
    let raw = unquote_token(&body).map_err(AcquisitionError::BadResponse)?;
    let token = codec::decode(raw.as_bytes())?;
    Ok((raw, token))
}

/// The issuer answers with the bearer token as a JSON string literal.
///
/// Whitespace inside the quotes is dropped, so the stored bearer value is
/// exactly what gets decoded.
pub(crate) fn unquote_token(body: &str) -> Result<String, String> {
    serde_json::from_str::<String>(body.trim())
        .map(|token| token.trim().to_owned())
        .map_err(|e| format!("body is not a JSON string: {}", e))
}
