// src/domain/user/repository.rs
use crate::domain::errors::DomainResult;
use crate::domain::user::{
    entity::User,
    value_objects::{Email, UserId},
};
use async_trait::async_trait;

/// User store as seen from inside a unit of work.
#[async_trait]
pub trait UserRepository: Send {
    async fn find_by_email(&mut self, email: &Email) -> DomainResult<Option<User>>;

    /// Fetch a user and hold it exclusively until the unit of work ends.
    /// Every write to a user's refresh tokens that must not interleave with
    /// another one takes this lock first.
    async fn lock_by_id(&mut self, id: UserId) -> DomainResult<Option<User>>;

    /// Persist a new user. A duplicate email yields `DomainError::Conflict`.
    async fn insert(&mut self, user: User) -> DomainResult<()>;
}
