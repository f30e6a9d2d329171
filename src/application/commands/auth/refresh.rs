use super::{AuthCommandService, issue::TokenIssuer};
use crate::{
    application::{
        dto::TokenPairDto,
        error::{ApplicationError, ApplicationResult},
        ports::transaction::UnitOfWork,
    },
    domain::{
        token::{RevocationReason, RevokedToken, TokenId},
        user::UserId,
    },
};
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub struct RefreshTokenCommand {
    pub refresh_token: String,
}

/// Result of a committed rotation attempt. Reuse detection is not an `Err`
/// inside the unit of work because its containment writes must commit.
enum Rotation {
    Rotated(TokenPairDto),
    ReuseDetected {
        token_id: TokenId,
        user_id: UserId,
        swept: usize,
    },
}

impl AuthCommandService {
    pub async fn refresh(&self, command: RefreshTokenCommand) -> ApplicationResult<TokenPairDto> {
        let presented = TokenId::from_bearer(&command.refresh_token)
            .map_err(|_| ApplicationError::TokenNotFound)?;

        let issuer = Arc::clone(&self.issuer);
        let rotation = self
            .transactions
            .run(move |uow| Box::pin(async move { issuer.rotate(uow, presented).await }))
            .await?;

        match rotation {
            Rotation::Rotated(pair) => Ok(pair),
            Rotation::ReuseDetected {
                token_id,
                user_id,
                swept,
            } => {
                tracing::warn!(
                    token_id = %token_id,
                    user_id = %user_id,
                    swept,
                    "revoked refresh token presented; revoked remaining sessions"
                );
                Err(ApplicationError::TokenRevoked)
            }
        }
    }
}

impl TokenIssuer {
    /// Every path that writes a user's refresh tokens takes the owner lock
    /// before touching them, so a rotation and a containment sweep for the
    /// same user never interleave.
    async fn rotate(&self, uow: &mut dyn UnitOfWork, presented: TokenId) -> ApplicationResult<Rotation> {
        let now = self.now();

        if let Some(revoked) = uow.revoked_tokens().find_by_id(presented).await? {
            uow.users().lock_by_id(revoked.user_id).await?;
            ensure_not_active(uow, presented).await?;
            let swept = revoke_all_for_user(uow, revoked.user_id, now).await?;
            return Ok(Rotation::ReuseDetected {
                token_id: presented,
                user_id: revoked.user_id,
                swept,
            });
        }

        let owner = uow
            .refresh_tokens()
            .find_by_id(presented)
            .await?
            .ok_or(ApplicationError::TokenNotFound)?
            .user_id;

        if uow.users().lock_by_id(owner).await?.is_none() {
            tracing::warn!(token_id = %presented, user_id = %owner, "refresh token owner missing");
            return Err(ApplicationError::TokenNotFound);
        }

        // Re-read under the owner lock; a rotation or sweep that committed
        // while this one waited has removed the record.
        let current = uow
            .refresh_tokens()
            .find_by_id(presented)
            .await?
            .ok_or(ApplicationError::TokenNotFound)?;

        if current.is_expired(now) {
            return Err(ApplicationError::TokenExpired);
        }

        if !uow.refresh_tokens().delete_by_id(current.id).await? {
            return Err(ApplicationError::TokenNotFound);
        }
        uow.revoked_tokens()
            .insert(RevokedToken::of(&current, RevocationReason::Rotated, now))
            .await?;

        let pair = self.issue_pair(uow, current.user_id, now).await?;
        tracing::debug!(token_id = %current.id, user_id = %current.user_id, "refresh token rotated");

        Ok(Rotation::Rotated(pair))
    }
}

/// A token id must never be both active and revoked.
pub(super) async fn ensure_not_active(uow: &mut dyn UnitOfWork, token_id: TokenId) -> ApplicationResult<()> {
    if uow.refresh_tokens().find_by_id(token_id).await?.is_some() {
        tracing::error!(
            token_id = %token_id,
            "refresh token is present in both the active and the revoked store"
        );
        return Err(ApplicationError::infrastructure("refresh token store inconsistency"));
    }
    Ok(())
}

async fn revoke_all_for_user(
    uow: &mut dyn UnitOfWork,
    user_id: UserId,
    now: DateTime<Utc>,
) -> ApplicationResult<usize> {
    let swept = uow.refresh_tokens().delete_all_by_user(user_id).await?;
    for token in &swept {
        uow.revoked_tokens()
            .insert(RevokedToken::of(token, RevocationReason::ReuseDetected, now))
            .await?;
    }
    Ok(swept.len())
}
