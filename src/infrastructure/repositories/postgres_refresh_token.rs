// src/infrastructure/repositories/postgres_refresh_token.rs
use super::{map_sqlx, postgres_unit_of_work::PostgresUnitOfWork};
use crate::domain::errors::DomainResult;
use crate::domain::token::{RefreshToken, RefreshTokenRepository, TokenId};
use crate::domain::user::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct RefreshTokenRow {
    id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            id: TokenId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresUnitOfWork {
    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RefreshToken>> {
        // No row lock: writers serialise on the owning user row instead, so
        // token rows are never locked ahead of it.
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            "SELECT id, user_id, expires_at, created_at
             FROM refresh_tokens WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(row.map(RefreshToken::from))
    }

    async fn insert(&mut self, token: RefreshToken) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, expires_at, created_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(token.id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(())
    }

    async fn delete_by_id(&mut self, id: TokenId) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_by_user(&mut self, user_id: UserId) -> DomainResult<Vec<RefreshToken>> {
        let rows = sqlx::query_as::<_, RefreshTokenRow>(
            "DELETE FROM refresh_tokens WHERE user_id = $1
             RETURNING id, user_id, expires_at, created_at",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_sqlx)?;

        Ok(rows.into_iter().map(RefreshToken::from).collect())
    }
}
