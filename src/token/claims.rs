use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::DecodeError;

pub const CLAIM_SUBJECT: &str = "sub";
pub const CLAIM_ISSUED_AT: &str = "iat";
pub const CLAIM_EXPIRES_AT: &str = "exp";
pub const CLAIM_IP: &str = "ip";
pub const CLAIM_CAMPUSES: &str = "x-hasura-campuses";
pub const CLAIM_HASURA: &str = "https://hasura.io/jwt/claims";

/// Decoded claims of a bearer token.
///
/// The full claim set is kept in issuer order so it can be sent back verbatim
/// on renewal; the well-known fields are validated and cached on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    subject: String,
    issued_at: Option<i64>,
    expires_at: i64, // UNIX TIMESTAMP
    claims: Map<String, Value>,
}

impl Token {
    /// Validate a raw claim set.
    ///
    /// `exp` and `sub` are required; when `iat` is present `exp` must be strictly after it.
    pub fn from_claims(claims: Map<String, Value>) -> Result<Self, DecodeError> {
        let expires_at = claims
            .get(CLAIM_EXPIRES_AT)
            .ok_or_else(|| DecodeError::InvalidClaims("missing 'exp' claim".to_owned()))
            .and_then(|v| timestamp(CLAIM_EXPIRES_AT, v))?;

        let subject = match claims.get(CLAIM_SUBJECT) {
            Some(Value::String(s)) if !s.is_empty() => s.to_owned(),
            Some(Value::Number(n)) => n.to_string(),
            Some(_) => {
                return Err(DecodeError::InvalidClaims(
                    "'sub' claim must be a non-empty string".to_owned(),
                ))
            }
            None => return Err(DecodeError::InvalidClaims("missing 'sub' claim".to_owned())),
        };

        let issued_at = claims
            .get(CLAIM_ISSUED_AT)
            .map(|v| timestamp(CLAIM_ISSUED_AT, v))
            .transpose()?;

        if let Some(iat) = issued_at {
            if expires_at <= iat {
                return Err(DecodeError::InvalidClaims(format!(
                    "'exp' ({}) must be later than 'iat' ({})",
                    expires_at, iat
                )));
            }
        }

        Ok(Self {
            subject,
            issued_at,
            expires_at,
            claims,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issued_at(&self) -> Option<i64> {
        self.issued_at
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Originating IP the issuer recorded for this token
    pub fn ip(&self) -> Option<&str> {
        self.claims.get(CLAIM_IP).and_then(Value::as_str)
    }

    pub fn campuses(&self) -> Option<&Map<String, Value>> {
        self.claims.get(CLAIM_CAMPUSES).and_then(Value::as_object)
    }

    /// Namespaced Hasura claims (`x-hasura-*` roles and ids)
    pub fn hasura_claims(&self) -> Option<&Map<String, Value>> {
        self.claims.get(CLAIM_HASURA).and_then(Value::as_object)
    }

    /// Raw access to any claim
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Typed access to any claim. `None` if absent or of a different shape.
    pub fn claim_as<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        self.claims
            .get(name)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}

/// Serializes as the issuer's claim object, as expected by the refresh route
impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.claims.serialize(serializer)
    }
}

fn timestamp(name: &str, value: &Value) -> Result<i64, DecodeError> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| DecodeError::InvalidClaims(format!("'{}' claim is not a timestamp", name)))
}
