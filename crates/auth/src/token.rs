//! Identity tokens: HS256 JWTs carrying a username and an admin flag.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AuthError;

/// Verified identity attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    /// Username the token was issued to.
    pub subject: String,
    pub is_admin: bool,
}

impl IdentityClaims {
    pub fn new(subject: impl Into<String>, is_admin: bool) -> Self {
        Self {
            subject: subject.into(),
            is_admin,
        }
    }
}

/// On-the-wire token payload.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenPayload {
    sub: String,
    #[serde(default)]
    is_admin: bool,
    iat: i64,
}

/// Signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        // Tokens don't expire; only the signature and algorithm are checked.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `subject`.
    pub fn issue(&self, subject: &str, is_admin: bool) -> Result<String, AuthError> {
        let payload = TokenPayload {
            sub: subject.to_string(),
            is_admin,
            iat: Utc::now().timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)?)
    }

    /// Verify a bare token and return its claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, AuthError> {
        let data = decode::<TokenPayload>(token, &self.decoding, &self.validation)?;
        Ok(IdentityClaims {
            subject: data.claims.sub,
            is_admin: data.claims.is_admin,
        })
    }

    /// Turn an optional credential into optional claims.
    ///
    /// A leading `Bearer ` is stripped. Missing, malformed or badly signed
    /// credentials all yield `None`; this never fails. Access decisions
    /// belong to the gates.
    pub fn extract_identity(&self, credential: Option<&str>) -> Option<IdentityClaims> {
        let credential = credential?.trim();
        let token = credential
            .strip_prefix("Bearer ")
            .or_else(|| credential.strip_prefix("bearer "))
            .unwrap_or(credential)
            .trim();

        if token.is_empty() {
            return None;
        }

        match self.verify(token) {
            Ok(claims) => Some(claims),
            Err(err) => {
                debug!(error = %err, "ignoring unverifiable credential");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::from_secret(b"test-secret")
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys();
        let token = keys.issue("alice", true).unwrap();

        let claims = keys.verify(&token).unwrap();

        assert_eq!(claims, IdentityClaims::new("alice", true));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = TokenKeys::from_secret(b"other").issue("alice", false).unwrap();
        assert!(matches!(keys().verify(&token), Err(AuthError::Token(_))));
    }

    #[test]
    fn extract_accepts_bearer_and_bare_tokens() {
        let keys = keys();
        let token = keys.issue("bob", false).unwrap();

        let expected = Some(IdentityClaims::new("bob", false));
        assert_eq!(keys.extract_identity(Some(format!("Bearer {token}").as_str())), expected);
        assert_eq!(keys.extract_identity(Some(token.as_str())), expected);
    }

    #[test]
    fn extract_swallows_garbage() {
        let keys = keys();
        assert_eq!(keys.extract_identity(Some("not-a-real-token")), None);
        assert_eq!(keys.extract_identity(Some("Bearer not-a-real-token")), None);
        assert_eq!(keys.extract_identity(Some("Bearer ")), None);
        assert_eq!(keys.extract_identity(Some("")), None);
        assert_eq!(keys.extract_identity(None), None);
    }

    #[test]
    fn missing_admin_flag_defaults_to_false() {
        let keys = keys();
        let payload = serde_json::json!({ "sub": "carol", "iat": 0 });
        let token = encode(&Header::default(), &payload, &EncodingKey::from_secret(b"test-secret")).unwrap();

        assert_eq!(keys.verify(&token).unwrap(), IdentityClaims::new("carol", false));
    }
}
