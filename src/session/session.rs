use std::fmt;

use reqwest::Client;
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::errors::{AcquisitionError, DecodeError};
use crate::helpers::time::display_ts;
use crate::session::acquire::acquire;
use crate::token::claims::Token;
use crate::token::codec;
use crate::utils::constants::DEFAULT_SCHEME;

/// Opaque secret exchanged for the first bearer token. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// The bearer value and its decoded claims. Only ever replaced as a pair.
#[derive(Debug)]
pub struct TokenState {
    raw: String,
    token: Token,
}

impl TokenState {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub(crate) fn install(&mut self, raw: String, token: Token) {
        self.raw = raw;
        self.token = token;
    }
}

/// Authenticated session against one issuer.
///
/// Endpoint and credential are fixed at construction. The token pair sits
/// behind a single async mutex: queries and renewals hold it for their whole
/// duration, so they are strictly serialized against each other.
pub struct Session {
    base_url: String,
    credential: Credential,
    http: Client,
    state: Mutex<TokenState>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Exchange `credential` for a first token and build the session around it.
    pub async fn establish(
        endpoint: &str,
        credential: Credential,
        http: Client,
    ) -> Result<Self, AcquisitionError> {
        let base_url = resolve_base_url(endpoint);
        let (raw, token) = acquire(&http, &base_url, &credential).await?;
        info!(
            subject = %token.subject(),
            expires_at = %display_ts(token.expires_at()),
            "session established"
        );
        Ok(Self::from_parts(base_url, credential, http, raw, token))
    }

    /// Build a session around an already issued raw token.
    ///
    /// The claims are decoded from `raw` here, so the pair always matches.
    pub fn with_token(
        endpoint: &str,
        credential: Credential,
        http: Client,
        raw: &str,
    ) -> Result<Self, DecodeError> {
        let raw = raw.trim();
        let token = codec::decode(raw.as_bytes())?;
        Ok(Self::from_parts(
            resolve_base_url(endpoint),
            credential,
            http,
            raw.to_owned(),
            token,
        ))
    }

    fn from_parts(
        base_url: String,
        credential: Credential,
        http: Client,
        raw: String,
        token: Token,
    ) -> Self {
        Self {
            base_url,
            credential,
            http,
            state: Mutex::new(TokenState { raw, token }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// Exclusive access to the token pair. Held guards block queries and renewals.
    pub(crate) async fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().await
    }

    /// Consistent copy of the current raw token and its claims
    pub async fn snapshot(&self) -> (String, Token) {
        let state = self.lock().await;
        (state.raw.clone(), state.token.clone())
    }

    pub async fn token_expires_at(&self) -> i64 {
        self.lock().await.token.expires_at()
    }
}

/// A bare host gets the default scheme; anything carrying a scheme is kept as is.
pub fn resolve_base_url(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_owned()
    } else {
        format!("{}://{}", DEFAULT_SCHEME, endpoint)
    }
}
