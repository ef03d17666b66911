use chrono::{DateTime, Utc};

use crate::domain::OwnerId;

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub owner: OwnerId,
    pub expires_at: DateTime<Utc>,
}

/// Bearer credential boundary: the core trusts the resolved identity for
/// job ownership checks only.
pub trait Authenticator: Send + Sync {
    fn issue(&self, owner: OwnerId) -> Result<IssuedToken, AuthError>;

    fn verify(&self, token: &str) -> Result<OwnerId, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("signing failed: {0}")]
    SigningFailed(String),
}
