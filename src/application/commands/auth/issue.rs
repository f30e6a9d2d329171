use crate::{
    application::{
        dto::{TokenPairDto, auth::TOKEN_TYPE_BEARER},
        error::{ApplicationError, ApplicationResult},
        ports::{security::TokenSigner, time::Clock, transaction::UnitOfWork, util::IdGenerator},
    },
    domain::{
        token::{RefreshToken, TokenId},
        user::UserId,
    },
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Lifetimes of the two credentials handed out together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenPolicy {
    pub fn new(
        access_ttl: std::time::Duration,
        refresh_ttl: std::time::Duration,
    ) -> ApplicationResult<Self> {
        let access_ttl = Duration::from_std(access_ttl)
            .map_err(|_| ApplicationError::validation("access token ttl is out of range"))?;
        let refresh_ttl = Duration::from_std(refresh_ttl)
            .map_err(|_| ApplicationError::validation("refresh token ttl is out of range"))?;

        if access_ttl <= Duration::zero() || refresh_ttl <= Duration::zero() {
            return Err(ApplicationError::validation("token ttls must be positive"));
        }

        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

/// Everything needed to mint credentials. Shared by value into units of
/// work, so it holds only owned handles.
pub(super) struct TokenIssuer {
    pub(super) clock: Arc<dyn Clock>,
    pub(super) ids: Arc<dyn IdGenerator>,
    pub(super) signer: Arc<dyn TokenSigner>,
    pub(super) policy: TokenPolicy,
}

impl TokenIssuer {
    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(super) fn next_user_id(&self) -> UserId {
        UserId::from_uuid(self.ids.new_id())
    }

    fn next_token_id(&self) -> TokenId {
        TokenId::from_uuid(self.ids.new_id())
    }

    /// Persist a fresh refresh token for `user_id` and sign a matching access
    /// token. The caller owns the surrounding unit of work.
    pub(super) async fn issue_pair(
        &self,
        uow: &mut dyn UnitOfWork,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> ApplicationResult<TokenPairDto> {
        let access_expires_at = now + self.policy.access_ttl;
        let access_token = self.signer.sign(user_id, access_expires_at).await?;

        let refresh = RefreshToken::issue(self.next_token_id(), user_id, now, self.policy.refresh_ttl);
        let refresh_token = refresh.id.to_bearer();
        let refresh_expires_at = refresh.expires_at;
        uow.refresh_tokens().insert(refresh).await?;

        Ok(TokenPairDto {
            access_token,
            refresh_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            access_expires_at,
            refresh_expires_at,
            expires_in: self.policy.access_ttl.num_seconds(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_rejects_zero_ttl() {
        let err = TokenPolicy::new(
            std::time::Duration::from_secs(0),
            std::time::Duration::from_secs(60),
        )
        .unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
    }

    #[test]
    fn policy_keeps_configured_ttls() {
        let policy = TokenPolicy::new(
            std::time::Duration::from_secs(900),
            std::time::Duration::from_secs(86_400),
        )
        .unwrap();
        assert_eq!(policy.access_ttl(), Duration::minutes(15));
        assert_eq!(policy.refresh_ttl(), Duration::days(1));
    }
}
