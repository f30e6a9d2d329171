// src/infrastructure/repositories/postgres_revoked_token.rs
use super::{map_sqlx, postgres_unit_of_work::PostgresUnitOfWork};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::token::{RevokedToken, RevokedTokenRepository, TokenId};
use crate::domain::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct RevokedTokenRow {
    token_id: Uuid,
    user_id: Uuid,
    reason: String,
    revoked_at: DateTime<Utc>,
}

impl TryFrom<RevokedTokenRow> for RevokedToken {
    type Error = DomainError;

    fn try_from(row: RevokedTokenRow) -> Result<Self, Self::Error> {
        Ok(RevokedToken {
            token_id: TokenId::from_uuid(row.token_id),
            user_id: UserId::from_uuid(row.user_id),
            reason: row.reason.parse()?,
            revoked_at: row.revoked_at,
        })
    }
}

#[async_trait]
impl RevokedTokenRepository for PostgresUnitOfWork {
    async fn exists(&mut self, id: TokenId) -> DomainResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx)
    }

    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RevokedToken>> {
        let row = sqlx::query_as::<_, RevokedTokenRow>(
            "SELECT token_id, user_id, reason, revoked_at
             FROM revoked_tokens WHERE token_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        row.map(RevokedToken::try_from).transpose()
    }

    async fn insert(&mut self, revoked: RevokedToken) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO revoked_tokens (token_id, user_id, reason, revoked_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (token_id) DO NOTHING",
        )
        .bind(revoked.token_id.as_uuid())
        .bind(revoked.user_id.as_uuid())
        .bind(revoked.reason.as_str())
        .bind(revoked.revoked_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }
}
