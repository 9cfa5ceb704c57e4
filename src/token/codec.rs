//! Bearer token decoding.
//!
//! Known limitation: the signature segment is never verified. The client holds
//! no verification key, so it trusts the TLS channel and the issuer endpoint
//! that handed the token out, not the token's signature. Claims read here are
//! used for scheduling renewals only, never for authorization decisions.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::errors::DecodeError;
use crate::token::claims::Token;

const SEGMENTS: usize = 3;
const CLAIMS_SEGMENT: usize = 1;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
// issuers emit url-safe segments; some older ones use the standard alphabet
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decode a raw bearer token (`header.claims.signature`) into its claims.
pub fn decode(raw_token: &[u8]) -> Result<Token, DecodeError> {
    let raw = std::str::from_utf8(raw_token)
        .map_err(|e| DecodeError::InvalidEncoding(format!("token is not utf-8: {}", e)))?
        .trim();

    let parts: Vec<&str> = raw.split('.').collect();
    if parts.len() != SEGMENTS {
        return Err(DecodeError::MalformedStructure { segments: parts.len() });
    }

    let payload = parts[CLAIMS_SEGMENT];
    let decoded = URL_SAFE
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))
        .map_err(|e| DecodeError::InvalidEncoding(format!("base64 decode error: {}", e)))?;

    let claims = match serde_json::from_slice::<Value>(&decoded) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(DecodeError::InvalidEncoding(format!(
                "claims segment is not a JSON object: {}",
                other
            )))
        }
        Err(e) => return Err(DecodeError::InvalidEncoding(format!("invalid JWT payload: {}", e))),
    };

    let token = Token::from_claims(claims)?;
    debug!(subject = %token.subject(), expires_at = token.expires_at(), "token decoded");
    Ok(token)
}

#[cfg(test)]
mod test {
    use super::*;
    use base64::engine::general_purpose::{STANDARD as STD_PAD, URL_SAFE_NO_PAD};
    use serde_json::json;

    fn token_with(claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn decodes_well_known_and_custom_claims() {
        let raw = token_with(json!({
            "sub": "4242",
            "iat": 1700000000,
            "exp": 1700003600,
            "ip": "10.0.0.1",
            "x-hasura-campuses": {"1": "paris"},
            "https://hasura.io/jwt/claims": {"x-hasura-user-id": "4242"}
        }));

        let token = decode(raw.as_bytes()).unwrap();
        assert_eq!(token.subject(), "4242");
        assert_eq!(token.issued_at(), Some(1700000000));
        assert_eq!(token.expires_at(), 1700003600);
        assert!(token.expires_at() > token.issued_at().unwrap());
        assert_eq!(token.ip(), Some("10.0.0.1"));
        assert_eq!(token.campuses().unwrap()["1"], "paris");
        assert_eq!(
            token.hasura_claims().unwrap()["x-hasura-user-id"],
            json!("4242")
        );
        assert_eq!(token.claim_as::<String>("ip").as_deref(), Some("10.0.0.1"));
        assert_eq!(token.claim_as::<u64>("ip"), None);
    }

    #[test]
    fn accepts_padded_standard_alphabet() {
        let claims = json!({"sub": "a", "exp": 1700003600, "note": "??>>"}).to_string();
        let raw = format!("e30.{}.sig", STD_PAD.encode(claims));

        let token = decode(raw.as_bytes()).unwrap();
        assert_eq!(token.claim("note"), Some(&json!("??>>")));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        for raw in ["", "only-one", "two.parts", "a.b.c.d"] {
            let err = decode(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, DecodeError::MalformedStructure { .. }), "{raw}: {err}");
        }
    }

    #[test]
    fn garbage_payload_is_invalid_encoding() {
        let err = decode(b"e30.***.sig").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEncoding(_)));

        let not_json = format!("e30.{}.sig", URL_SAFE_NO_PAD.encode("not json"));
        let err = decode(not_json.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEncoding(_)));

        let array = format!("e30.{}.sig", URL_SAFE_NO_PAD.encode("[1,2]"));
        let err = decode(array.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidEncoding(_)));
    }

    #[test]
    fn missing_exp_is_invalid_claims() {
        let raw = token_with(json!({"sub": "4242", "iat": 1700000000}));
        let err = decode(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidClaims(_)));
    }

    #[test]
    fn missing_sub_is_invalid_claims() {
        let raw = token_with(json!({"exp": 1700003600}));
        let err = decode(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidClaims(_)));
    }

    #[test]
    fn exp_not_after_iat_is_invalid_claims() {
        let raw = token_with(json!({"sub": "x", "iat": 1700003600, "exp": 1700003600}));
        let err = decode(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidClaims(_)));
    }

    #[test]
    fn serializes_back_to_issued_claims() {
        let claims = json!({"sub": "x", "exp": 1700003600, "ip": "1.2.3.4"});
        let token = decode(token_with(claims.clone()).as_bytes()).unwrap();
        assert_eq!(serde_json::to_value(&token).unwrap(), claims);
    }
}
