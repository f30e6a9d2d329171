// src/domain/token/entity.rs
use crate::domain::token::value_objects::{RevocationReason, TokenId};
use crate::domain::user::UserId;
use chrono::{DateTime, Duration, Utc};

/// An issued, not yet consumed refresh credential. Presence in the refresh
/// token store is what makes it usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: TokenId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn issue(id: TokenId, user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id,
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    /// A token is expired at its `expires_at` instant, not after it.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Permanent tombstone for a token id that must never validate again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevokedToken {
    pub token_id: TokenId,
    pub user_id: UserId,
    pub reason: RevocationReason,
    pub revoked_at: DateTime<Utc>,
}

impl RevokedToken {
    pub fn new(
        token_id: TokenId,
        user_id: UserId,
        reason: RevocationReason,
        revoked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_id,
            user_id,
            reason,
            revoked_at,
        }
    }

    pub fn of(token: &RefreshToken, reason: RevocationReason, revoked_at: DateTime<Utc>) -> Self {
        Self::new(token.id, token.user_id, reason, revoked_at)
    }
}
