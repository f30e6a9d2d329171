use super::AuthCommandService;
use crate::{
    application::{
        dto::RegisteredUserDto,
        error::{ApplicationError, ApplicationResult},
        ports::transaction::UnitOfWork,
    },
    domain::{
        errors::DomainError,
        user::{Email, PasswordHash, User, Username},
    },
};

pub struct RegisterUserCommand {
    pub username: String,
    pub email: String,
    /// Length policy is enforced by the caller.
    pub password: String,
}

impl AuthCommandService {
    pub async fn register(&self, command: RegisterUserCommand) -> ApplicationResult<RegisteredUserDto> {
        let username = Username::new(command.username)?;
        let email = Email::new(command.email)?;

        let hashed = self.password_hasher.hash(&command.password).await?;
        let user = User::register(
            self.issuer.next_user_id(),
            username,
            email,
            PasswordHash::new(hashed)?,
            self.issuer.now(),
        );
        let user_id = user.id;

        self.transactions
            .run(move |uow| Box::pin(async move { insert_unique(uow, user).await }))
            .await?;

        tracing::info!(user_id = %user_id, "user registered");
        Ok(RegisteredUserDto { user_id })
    }
}

async fn insert_unique(uow: &mut dyn UnitOfWork, user: User) -> ApplicationResult<()> {
    if uow.users().find_by_email(&user.email).await?.is_some() {
        return Err(ApplicationError::EmailAlreadyExists);
    }

    // The store's unique constraint still catches a concurrent registration.
    uow.users().insert(user).await.map_err(|err| match err {
        DomainError::Conflict(_) => ApplicationError::EmailAlreadyExists,
        other => other.into(),
    })
}
