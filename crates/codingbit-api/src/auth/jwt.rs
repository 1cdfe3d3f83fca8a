//! HS256 session tokens.

use chrono::{Duration, Utc};
use codingbit_core::models::User;
use codingbit_core::AppError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and verifies session tokens signed with the shared secret.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        }
    }

    /// Issue a token for the given user.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::InvalidToken("Token has expired".to_string())
                }
                ErrorKind::InvalidSignature => {
                    AppError::InvalidToken("Invalid token signature".to_string())
                }
                _ => AppError::InvalidToken("Invalid token".to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-min-32-characters-long!!";

    fn test_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            nickname: "tester".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let jwt = JwtService::new(SECRET, 24);
        let user = test_user("alice@example.com");

        let token = jwt.issue(&user).unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let jwt = JwtService::new(SECRET, 24);
        let other = JwtService::new("another-secret-also-32-characters-xx", 24);
        let token = jwt.issue(&test_user("alice@example.com")).unwrap();

        let err = other.verify(&token).unwrap_err();
        match err {
            AppError::InvalidToken(msg) => assert_eq!(msg, "Invalid token signature"),
            _ => panic!("Expected InvalidToken"),
        }
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtService::new(SECRET, -1);
        let token = jwt.issue(&test_user("alice@example.com")).unwrap();

        let err = jwt.verify(&token).unwrap_err();
        match err {
            AppError::InvalidToken(msg) => assert_eq!(msg, "Token has expired"),
            _ => panic!("Expected InvalidToken"),
        }
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let jwt = JwtService::new(SECRET, 24);
        assert!(jwt.verify("not-a-jwt").is_err());
    }
}
