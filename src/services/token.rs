//! Signed identity tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Identity, Role, UserId};

#[derive(Debug, Error)]
pub enum TokenError {
    /// Malformed, expired, or signed with another key.
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: i32,
    username: String,
    role: Role,
    iat: i64,
    exp: i64,
    jti: String,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Random 48-byte secret for processes started without `JWT_SECRET`.
    #[must_use]
    pub fn random_secret() -> Vec<u8> {
        use rand::RngCore;

        let mut secret = vec![0u8; 48];
        rand::rng().fill_bytes(&mut secret);
        secret
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id: identity.id.value(),
            username: identity.username.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks signature and expiry. Does not consult the blacklist.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        Ok(Identity {
            id: UserId::new(data.claims.id),
            username: data.claims.username,
            role: data.claims.role,
        })
    }

    /// Reads `exp` without checking the signature. Only used to decide how
    /// long a revoked token has to stay on the blacklist.
    pub fn decode_expiry(&self, token: &str) -> Result<DateTime<Utc>, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        DateTime::from_timestamp(data.claims.exp, 0)
            .ok_or_else(|| TokenError::Invalid(format!("exp out of range: {}", data.claims.exp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity {
            id: UserId::new(3),
            username: "alice".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(24));
        let token = tokens.issue(&alice()).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), alice());
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(24));
        let a = tokens.issue(&alice()).unwrap();
        let b = tokens.issue(&alice()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = TokenService::new(b"one", Duration::hours(24));
        let verifier = TokenService::new(b"two", Duration::hours(24));
        let token = issuer.issue(&alice()).unwrap();

        assert!(matches!(
            verifier.verify(&token),
            Err(TokenError::Invalid(_))
        ));
        // Expiry is still readable for blacklist retention.
        assert!(verifier.decode_expiry(&token).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Past the default 60s leeway.
        let tokens = TokenService::new(b"test-secret", Duration::seconds(-120));
        let token = tokens.issue(&alice()).unwrap();
        assert!(tokens.verify(&token).is_err());

        let exp = tokens.decode_expiry(&token).unwrap();
        assert!(exp < Utc::now());
    }

    #[test]
    fn test_decode_expiry_matches_ttl() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(24));
        let token = tokens.issue(&alice()).unwrap();
        let exp = tokens.decode_expiry(&token).unwrap();

        let expected = Utc::now() + Duration::hours(24);
        assert!((expected - exp).num_seconds().abs() <= 5);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(24));
        assert!(tokens.verify("not.a.token").is_err());
        assert!(tokens.decode_expiry("garbage").is_err());
    }

    #[test]
    fn test_random_secret_length() {
        let a = TokenService::random_secret();
        let b = TokenService::random_secret();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}
