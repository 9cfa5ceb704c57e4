use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::{DecodeError, RenewalError};
use crate::helpers::time::{display_ts, now_i64};
use crate::session::acquire::unquote_token;
use crate::session::session::Session;
use crate::token::claims::Token;
use crate::token::codec;
use crate::utils::constants::REFRESH_ROUTE;

#[derive(Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "x-jwt-token")]
    token: &'a Token,
}

impl Session {
    /// Exchange the current token for a fresh one.
    ///
    /// Runs under the session lock. The new raw token and its claims are
    /// installed together, and only once both are known good; on any error the
    /// session keeps its current token. A reissued token that is already
    /// expired is rejected as [`RenewalError::InvalidToken`].
    pub async fn renew(&self) -> Result<(), RenewalError> {
        self.renew_ahead(0).await
    }

    /// Like [`renew`](Self::renew), but the new token must also outlive
    /// `safety_margin_seconds`, otherwise it would be due again right away.
    pub async fn renew_ahead(&self, safety_margin_seconds: u64) -> Result<(), RenewalError> {
        let mut state = self.lock().await;

        let response = self
            .http()
            .post(self.url(REFRESH_ROUTE))
            .json(&RefreshRequest { token: state.token() })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "refresh request failed");
                RenewalError::Network(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenewalError::BadResponse(format!(
                "HTTP request failed: {}",
                status
            )));
        }

        let body = response.text().await.map_err(RenewalError::Network)?;
        let raw = unquote_token(&body).map_err(RenewalError::BadResponse)?;
        let token = codec::decode(raw.as_bytes())?;

        let margin = i64::try_from(safety_margin_seconds).unwrap_or(i64::MAX);
        if token.expires_at() <= now_i64().saturating_add(margin) {
            warn!(
                expires_at = %display_ts(token.expires_at()),
                safety_margin_seconds,
                "issuer returned a token already due for renewal"
            );
            return Err(RenewalError::InvalidToken(DecodeError::InvalidClaims(format!(
                "renewed token expires at {}, within the {}s renewal margin",
                token.expires_at(),
                safety_margin_seconds
            ))));
        }

        info!(
            subject = %token.subject(),
            expires_at = %display_ts(token.expires_at()),
            "token renewed"
        );
        state.install(raw, token);
        Ok(())
    }
}
