use super::issue::{TokenIssuer, TokenPolicy};
use crate::application::{
    dto::AuthenticatedUser,
    error::ApplicationResult,
    ports::{
        security::{PasswordHasher, TokenSigner},
        time::Clock,
        transaction::TransactionRunner,
        util::IdGenerator,
    },
};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Register, login, refresh and logout over the transactional stores.
pub struct AuthCommandService {
    pub(super) transactions: Arc<dyn TransactionRunner>,
    pub(super) password_hasher: Arc<dyn PasswordHasher>,
    pub(super) issuer: Arc<TokenIssuer>,
    /// Hash verified against when a login names no account.
    pub(super) decoy_hash: OnceCell<String>,
}

impl AuthCommandService {
    pub fn new(
        transactions: Arc<dyn TransactionRunner>,
        password_hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            transactions,
            password_hasher,
            issuer: Arc::new(TokenIssuer {
                clock,
                ids,
                signer,
                policy,
            }),
            decoy_hash: OnceCell::new(),
        }
    }

    /// Resolve the subject of an access token.
    pub async fn authenticate(&self, access_token: &str) -> ApplicationResult<AuthenticatedUser> {
        let user_id = self.issuer.signer.verify(access_token).await?;
        Ok(AuthenticatedUser { user_id })
    }
}
