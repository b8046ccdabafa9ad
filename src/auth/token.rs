//! JWT access tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to.
    pub sub: String,
    /// Token id, for audit trails.
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenMaker {
    secret: String,
    ttl: Duration,
}

impl TokenMaker {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn create_token(&self, username: &str) -> Result<(String, Claims), AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_owned(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok((token, claims))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let maker = TokenMaker::new("test-secret", 900);
        let (token, issued) = maker.create_token("alice").unwrap();

        let claims = maker.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.jti, issued.jti);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Issued already past the default validation leeway.
        let maker = TokenMaker::new("test-secret", -120);
        let (token, _) = maker.create_token("alice").unwrap();

        assert!(matches!(
            maker.verify_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let maker = TokenMaker::new("test-secret", 900);
        let other = TokenMaker::new("other-secret", 900);
        let (token, _) = other.create_token("alice").unwrap();

        assert!(matches!(
            maker.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
