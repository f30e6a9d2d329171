use super::{AuthCommandService, refresh::ensure_not_active};
use crate::{
    application::{
        error::{ApplicationError, ApplicationResult},
        ports::transaction::UnitOfWork,
    },
    domain::{
        token::{RevocationReason, RevokedToken, TokenId},
        user::UserId,
    },
};
use chrono::{DateTime, Utc};

pub struct LogoutCommand {
    pub refresh_token: String,
}

impl AuthCommandService {
    /// Voluntarily revoke one refresh token. No containment: the holder is
    /// giving the token up, not replaying it.
    pub async fn logout(&self, command: LogoutCommand) -> ApplicationResult<()> {
        let presented = TokenId::from_bearer(&command.refresh_token)
            .map_err(|_| ApplicationError::TokenNotFound)?;
        let now = self.issuer.now();

        let user_id = self
            .transactions
            .run(move |uow| Box::pin(async move { revoke_one(uow, presented, now).await }))
            .await?;

        tracing::info!(token_id = %presented, user_id = %user_id, "refresh token revoked by holder");
        Ok(())
    }
}

async fn revoke_one(
    uow: &mut dyn UnitOfWork,
    token_id: TokenId,
    now: DateTime<Utc>,
) -> ApplicationResult<UserId> {
    if uow.revoked_tokens().exists(token_id).await? {
        ensure_not_active(uow, token_id).await?;
        return Err(ApplicationError::TokenRevoked);
    }

    let token = uow
        .refresh_tokens()
        .find_by_id(token_id)
        .await?
        .ok_or(ApplicationError::TokenNotFound)?;

    if !uow.refresh_tokens().delete_by_id(token_id).await? {
        return Err(ApplicationError::TokenNotFound);
    }
    uow.revoked_tokens()
        .insert(RevokedToken::of(&token, RevocationReason::Logout, now))
        .await?;

    Ok(token.user_id)
}
