//! Error taxonomy of the client.
//!
//! Query-level failures are not listed here: they travel inside
//! [`QueryResult`](crate::query::types::QueryResult) as data.

use thiserror::Error;

/// Failure to turn a raw bearer string into a [`Token`](crate::token::claims::Token)
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed token: expected 3 segments, found {segments}")]
    MalformedStructure { segments: usize },

    #[error("invalid token encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid token claims: {0}")]
    InvalidClaims(String),
}

/// Failure of the initial credential exchange
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("token request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected token response: {0}")]
    BadResponse(String),

    #[error("issuer returned an unusable token: {0}")]
    InvalidToken(#[from] DecodeError),
}

/// Failure to exchange the current token for a fresh one
#[derive(Debug, Error)]
pub enum RenewalError {
    #[error("refresh request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("unexpected refresh response: {0}")]
    BadResponse(String),

    #[error("issuer returned an unusable token: {0}")]
    InvalidToken(#[from] DecodeError),
}
