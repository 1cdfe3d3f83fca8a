//! Signed password reset tokens.
//!
//! Payload: expiry_ts (u64 BE) || user_id (16 bytes) = 24 bytes.
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).
//!
//! Tokens are stateless; a token stays valid until its expiry even if the
//! password has already been changed with it once.

use base64::Engine;
use codingbit_core::AppError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const PAYLOAD_LEN: usize = 8 + 16; // expiry + user_id
const MAC_LEN: usize = 32; // SHA256
const TOKEN_LEN: usize = PAYLOAD_LEN + MAC_LEN;

/// Build a signed reset token for the given user.
pub fn create(user_id: Uuid, expires_in: Duration, secret: &[u8]) -> String {
    let expiry_ts = SystemTime::now()
        .checked_add(expires_in)
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    create_with_expiry(user_id, expiry_ts, secret)
}

fn create_with_expiry(user_id: Uuid, expiry_ts: u64, secret: &[u8]) -> String {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[0..8].copy_from_slice(&expiry_ts.to_be_bytes());
    payload[8..24].copy_from_slice(user_id.as_bytes());

    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(&payload);
    let tag = mac.finalize().into_bytes();

    let mut token_bytes = [0u8; TOKEN_LEN];
    token_bytes[0..PAYLOAD_LEN].copy_from_slice(&payload);
    token_bytes[PAYLOAD_LEN..].copy_from_slice(&tag);

    base64_url_encode(&token_bytes)
}

/// Verify a reset token and return the user id it was issued for.
/// Expiry is checked only after the signature has been verified.
pub fn verify(token: &str, secret: &[u8]) -> Result<Uuid, AppError> {
    let decoded = base64_url_decode(token)
        .map_err(|_| AppError::InvalidToken("Invalid reset token".to_string()))?;
    if decoded.len() != TOKEN_LEN {
        return Err(AppError::InvalidToken("Invalid reset token".to_string()));
    }
    let (payload, tag) = decoded.split_at(PAYLOAD_LEN);
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(payload);
    mac.verify_slice(tag)
        .map_err(|_| AppError::InvalidToken("Invalid reset token".to_string()))?;

    let expiry_ts = u64::from_be_bytes(payload[0..8].try_into().unwrap());
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    if now > expiry_ts {
        return Err(AppError::InvalidToken("Reset token has expired".to_string()));
    }

    Ok(Uuid::from_bytes(payload[8..24].try_into().unwrap()))
}

fn base64_url_encode(data: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn base64_url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"reset-secret-at-least-32-characters!";

    #[test]
    fn test_round_trip() {
        let user_id = Uuid::new_v4();
        let token = create(user_id, Duration::from_secs(1800), SECRET);
        assert_eq!(verify(&token, SECRET).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_with_expiry(Uuid::new_v4(), 1, SECRET);
        let err = verify(&token, SECRET).unwrap_err();
        match err {
            AppError::InvalidToken(msg) => assert!(msg.contains("expired")),
            _ => panic!("Expected InvalidToken"),
        }
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = create(Uuid::new_v4(), Duration::from_secs(1800), SECRET);
        let mut bytes = base64_url_decode(&token).unwrap();
        bytes[9] ^= 0xff;
        let tampered = base64_url_encode(&bytes);
        assert!(verify(&tampered, SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create(Uuid::new_v4(), Duration::from_secs(1800), SECRET);
        assert!(verify(&token, b"a-different-secret-32-characters!!!!").is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify("not-base64!!!", SECRET).is_err());
        assert!(verify("", SECRET).is_err());
        assert!(verify(&base64_url_encode(b"short"), SECRET).is_err());
    }
}
