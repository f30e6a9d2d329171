// src/application/ports/security.rs
use crate::{application::ApplicationResult, domain::user::UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> ApplicationResult<String>;

    /// `Ok(false)` on mismatch; `Err` only when the hash cannot be processed.
    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<bool>;
}

/// Signs and verifies stateless access tokens.
#[async_trait]
pub trait TokenSigner: Send + Sync {
    async fn sign(&self, user_id: UserId, expires_at: DateTime<Utc>) -> ApplicationResult<String>;

    /// Every rejection (expired, malformed, foreign signature) is reported as
    /// `ApplicationError::InvalidToken`.
    async fn verify(&self, token: &str) -> ApplicationResult<UserId>;
}
