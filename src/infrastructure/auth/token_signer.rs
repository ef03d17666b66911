use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt::Write;
use uuid::Uuid;

use crate::application::ports::{AuthError, Authenticator, IssuedToken};
use crate::domain::OwnerId;

type HmacSha256 = Hmac<Sha256>;

/// Stateless bearer tokens: `base64url(owner_uuid:expires_unix).hex(hmac)`.
///
/// The signature covers the whole payload, so neither the owner nor the
/// expiry can be swapped without the secret.
pub struct HmacTokenSigner {
    secret_key: String,
    ttl: Duration,
}

impl HmacTokenSigner {
    pub fn new(secret_key: String, ttl_hours: i64) -> Self {
        Self {
            secret_key,
            ttl: Duration::hours(ttl_hours),
        }
    }

    fn sign(&self, payload: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        mac.update(payload.as_bytes());
        let bytes = mac.finalize().into_bytes();

        let mut hex = String::with_capacity(bytes.len() * 2);
        for byte in bytes {
            write!(&mut hex, "{:02x}", byte)
                .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        }
        Ok(hex)
    }
}

impl Authenticator for HmacTokenSigner {
    fn issue(&self, owner: OwnerId) -> Result<IssuedToken, AuthError> {
        let expires_at = Utc::now() + self.ttl;
        let payload = format!("{}:{}", owner.as_uuid(), expires_at.timestamp());
        let signature = self.sign(&payload)?;
        let token = format!("{}.{}", URL_SAFE_NO_PAD.encode(payload), signature);
        Ok(IssuedToken {
            token,
            owner,
            expires_at,
        })
    }

    fn verify(&self, token: &str) -> Result<OwnerId, AuthError> {
        let (encoded, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| AuthError::InvalidToken)?;
        let payload = String::from_utf8(payload_bytes).map_err(|_| AuthError::InvalidToken)?;

        let expected = self.sign(&payload)?;
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(AuthError::InvalidToken);
        }

        let (owner_str, expires_str) = payload.split_once(':').ok_or(AuthError::InvalidToken)?;
        let expires_unix: i64 = expires_str.parse().map_err(|_| AuthError::InvalidToken)?;
        let expires_at =
            DateTime::<Utc>::from_timestamp(expires_unix, 0).ok_or(AuthError::InvalidToken)?;
        if expires_at < Utc::now() {
            return Err(AuthError::Expired);
        }

        let owner_uuid = Uuid::parse_str(owner_str).map_err(|_| AuthError::InvalidToken)?;
        Ok(OwnerId::from_uuid(owner_uuid))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
