// tests/support/mocks/security.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tripkeeper::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{
        security::{PasswordHasher, TokenSigner},
        time::Clock,
    },
};
use tripkeeper::domain::user::UserId;

use super::time::ManualClock;

/// Reversible "hash" so tests stay fast; only an exact password verifies.
/// Clones share one verification counter.
#[derive(Clone, Debug, Default)]
pub struct StrictPasswordHasher {
    verifications: Arc<AtomicUsize>,
}

impl StrictPasswordHasher {
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordHasher for StrictPasswordHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<bool> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        match expected_hash.strip_prefix("plain:") {
            Some(stored) => Ok(stored == password),
            None => Err(ApplicationError::infrastructure("unrecognised hash format")),
        }
    }
}

/// Access tokens of the form `access:<user id>:<expiry unix seconds>`,
/// checked against the shared test clock.
#[derive(Clone, Debug)]
pub struct FakeTokenSigner {
    clock: Arc<ManualClock>,
}

impl FakeTokenSigner {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl TokenSigner for FakeTokenSigner {
    async fn sign(&self, user_id: UserId, expires_at: DateTime<Utc>) -> ApplicationResult<String> {
        Ok(format!("access:{user_id}:{}", expires_at.timestamp()))
    }

    async fn verify(&self, token: &str) -> ApplicationResult<UserId> {
        let mut parts = token.splitn(3, ':');
        let (Some("access"), Some(user), Some(exp)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ApplicationError::InvalidToken);
        };
        let user_id: UserId = user.parse().map_err(|_| ApplicationError::InvalidToken)?;
        let exp: i64 = exp.parse().map_err(|_| ApplicationError::InvalidToken)?;
        if self.clock.now().timestamp() > exp {
            return Err(ApplicationError::InvalidToken);
        }
        Ok(user_id)
    }
}
