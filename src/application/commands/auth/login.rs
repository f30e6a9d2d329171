use super::AuthCommandService;
use crate::{
    application::{
        dto::TokenPairDto,
        error::{ApplicationError, ApplicationResult},
        ports::transaction::UnitOfWork,
    },
    domain::user::{Email, User},
};
use std::sync::Arc;

const DECOY_PASSWORD: &str = "decoy password for unknown accounts";

pub struct LoginUserCommand {
    pub email: String,
    pub password: String,
}

impl AuthCommandService {
    pub async fn login(&self, command: LoginUserCommand) -> ApplicationResult<TokenPairDto> {
        // An address that does not parse cannot belong to an account.
        let user = match Email::new(command.email) {
            Ok(email) => {
                self.transactions
                    .run(move |uow| Box::pin(async move { find_by_email(uow, email).await }))
                    .await?
            }
            Err(_) => None,
        };

        // An unknown account costs one verification, same as a wrong password.
        let Some(user) = user else {
            self.verify_against_decoy(&command.password).await?;
            return Err(ApplicationError::InvalidCredentials);
        };

        let verified = self
            .password_hasher
            .verify(&command.password, user.password_hash.as_str())
            .await?;
        if !verified {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(ApplicationError::InvalidCredentials);
        }

        let issuer = Arc::clone(&self.issuer);
        let user_id = user.id;
        let pair = self
            .transactions
            .run(move |uow| {
                Box::pin(async move {
                    let now = issuer.now();
                    issuer.issue_pair(uow, user_id, now).await
                })
            })
            .await?;

        tracing::info!(user_id = %user_id, "user logged in");
        Ok(pair)
    }
}

impl AuthCommandService {
    async fn verify_against_decoy(&self, password: &str) -> ApplicationResult<()> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.password_hasher.hash(DECOY_PASSWORD))
            .await?;
        self.password_hasher.verify(password, decoy).await?;
        Ok(())
    }
}

async fn find_by_email(uow: &mut dyn UnitOfWork, email: Email) -> ApplicationResult<Option<User>> {
    Ok(uow.users().find_by_email(&email).await?)
}
