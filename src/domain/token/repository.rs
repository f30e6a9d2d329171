// src/domain/token/repository.rs
use crate::domain::errors::DomainResult;
use crate::domain::token::{
    entity::{RefreshToken, RevokedToken},
    value_objects::TokenId,
};
use crate::domain::user::UserId;
use async_trait::async_trait;

/// Active refresh tokens, addressed by their own id.
#[async_trait]
pub trait RefreshTokenRepository: Send {
    /// Look up an active token. Inside a unit of work implementations must
    /// hold the row until commit so concurrent rotations serialise on it.
    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RefreshToken>>;

    async fn insert(&mut self, token: RefreshToken) -> DomainResult<()>;

    /// Returns `false` when no record with that id existed.
    async fn delete_by_id(&mut self, id: TokenId) -> DomainResult<bool>;

    /// Remove every active token of a user and return the removed records.
    async fn delete_all_by_user(&mut self, user_id: UserId) -> DomainResult<Vec<RefreshToken>>;
}

/// Denylist of token ids. Entries are never deleted.
#[async_trait]
pub trait RevokedTokenRepository: Send {
    async fn exists(&mut self, id: TokenId) -> DomainResult<bool>;

    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RevokedToken>>;

    /// Inserting an id that is already revoked is a no-op.
    async fn insert(&mut self, revoked: RevokedToken) -> DomainResult<()>;
}
