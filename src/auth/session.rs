//! Session management and access-token claims

use jsonwebtoken::{DecodingKey, Validation};
use serde_json::Value;
use std::collections::BTreeSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::types::{Principal, TokenResponse};
use crate::error::Result;

/// Tokens are treated as expired this many seconds early.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Session data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The ID token
    pub id_token: Option<String>,

    /// The expiry timestamp
    pub expires_at: Option<i64>,
}

impl Session {
    /// Create a new session
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: Option<i64>) -> Self {
        Self {
            access_token,
            refresh_token,
            id_token: None,
            expires_at: expires_in.map(|expires_in| now() + expires_in),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => now() + EXPIRY_SKEW_SECS >= expires_at,
            None => false,
        }
    }

    /// Decode the user from the access token, reading roles from `roles_claim`.
    pub fn principal(&self, roles_claim: &str) -> Result<Principal> {
        let claims = decode_claims(&self.access_token)?;
        Ok(principal_from_claims(&claims, roles_claim))
    }
}

impl From<TokenResponse> for Session {
    fn from(response: TokenResponse) -> Self {
        let mut session = Session::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
        );
        session.id_token = response.id_token;
        session
    }
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as i64
}

/// Read the claims of a JWT without checking its signature.
///
/// The API validates tokens; the client only needs the claims to drive
/// the UX gate.
pub fn decode_claims(token: &str) -> Result<Value> {
    let header = jsonwebtoken::decode_header(token)?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

pub(crate) fn principal_from_claims(claims: &Value, roles_claim: &str) -> Principal {
    let roles = claims
        .get(roles_claim)
        .or_else(|| claims.pointer("/realm_access/roles"))
        .and_then(Value::as_array)
        .map(|roles| {
            roles
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    Principal {
        subject: claims
            .get("sub")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        username: claims
            .get("preferred_username")
            .and_then(Value::as_str)
            .map(str::to_string),
        roles,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    pub(crate) fn token_with(claims: Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn principal_reads_top_level_roles() {
        let token = token_with(json!({
            "sub": "user-1",
            "preferred_username": "alice",
            "roles": ["admin", "staff"]
        }));
        let session = Session::new(token, None, Some(300));

        let principal = session.principal("roles").unwrap();

        assert_eq!(principal.subject, "user-1");
        assert_eq!(principal.username.as_deref(), Some("alice"));
        assert!(principal.has_role("admin"));
        assert!(principal.has_role("staff"));
    }

    #[test]
    fn principal_falls_back_to_realm_access() {
        let token = token_with(json!({
            "sub": "user-2",
            "realm_access": { "roles": ["admin"] }
        }));
        let session = Session::new(token, None, None);

        let principal = session.principal("roles").unwrap();
        assert!(principal.has_role("admin"));
    }

    #[test]
    fn missing_roles_claim_means_no_roles() {
        let token = token_with(json!({ "sub": "user-3" }));
        let principal = Session::new(token, None, None).principal("roles").unwrap();

        assert!(principal.roles.is_empty());
    }

    #[test]
    fn expired_claims_still_decode() {
        let token = token_with(json!({ "sub": "user-4", "exp": 1 }));
        assert!(decode_claims(&token).is_ok());
    }

    #[test]
    fn opaque_token_is_rejected() {
        let session = Session::new("not-a-jwt".to_string(), None, None);
        assert!(session.principal("roles").is_err());
    }

    #[test]
    fn session_expiry_uses_skew() {
        let session = Session::new("token".to_string(), None, Some(10));
        assert!(session.is_expired());

        let session = Session::new("token".to_string(), None, Some(3600));
        assert!(!session.is_expired());

        let session = Session::new("token".to_string(), None, None);
        assert!(!session.is_expired());
    }
}
