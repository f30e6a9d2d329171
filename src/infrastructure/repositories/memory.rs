// src/infrastructure/repositories/memory.rs
use crate::{
    application::{
        ApplicationResult,
        ports::transaction::{TransactionRunner, UnitOfWork},
    },
    domain::{
        errors::{DomainError, DomainResult},
        token::{RefreshToken, RefreshTokenRepository, RevokedToken, RevokedTokenRepository, TokenId},
        user::{Email, User, UserId, UserRepository},
    },
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    refresh_tokens: HashMap<TokenId, RefreshToken>,
    revoked_tokens: HashMap<TokenId, RevokedToken>,
}

/// Process-local stores with serialisable units of work.
///
/// Units of work run one at a time: `begin` waits for the previous one to
/// finish, then hands out a private copy of the state that is published only
/// by `commit`.
#[derive(Clone, Default)]
pub struct InMemoryTransactionRunner {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryTransactionRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionRunner for InMemoryTransactionRunner {
    async fn begin(&self) -> ApplicationResult<Box<dyn UnitOfWork>> {
        let committed = Arc::clone(&self.state).lock_owned().await;
        let working = committed.clone();
        Ok(Box::new(InMemoryUnitOfWork { committed, working }))
    }
}

pub struct InMemoryUnitOfWork {
    committed: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn users(&mut self) -> &mut dyn UserRepository {
        self
    }

    fn refresh_tokens(&mut self) -> &mut dyn RefreshTokenRepository {
        self
    }

    fn revoked_tokens(&mut self) -> &mut dyn RevokedTokenRepository {
        self
    }

    async fn commit(self: Box<Self>) -> ApplicationResult<()> {
        let Self {
            mut committed,
            working,
        } = *self;
        *committed = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> ApplicationResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUnitOfWork {
    async fn find_by_email(&mut self, email: &Email) -> DomainResult<Option<User>> {
        Ok(self
            .working
            .users
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    // Units of work already run one at a time.
    async fn lock_by_id(&mut self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn insert(&mut self, user: User) -> DomainResult<()> {
        if self.working.users.contains_key(&user.id) {
            return Err(DomainError::Conflict("user id already exists".into()));
        }
        if self.working.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::Conflict("email already registered".into()));
        }
        self.working.users.insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryUnitOfWork {
    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RefreshToken>> {
        Ok(self.working.refresh_tokens.get(&id).cloned())
    }

    async fn insert(&mut self, token: RefreshToken) -> DomainResult<()> {
        if self.working.refresh_tokens.contains_key(&token.id) {
            return Err(DomainError::Conflict("refresh token id already exists".into()));
        }
        self.working.refresh_tokens.insert(token.id, token);
        Ok(())
    }

    async fn delete_by_id(&mut self, id: TokenId) -> DomainResult<bool> {
        Ok(self.working.refresh_tokens.remove(&id).is_some())
    }

    async fn delete_all_by_user(&mut self, user_id: UserId) -> DomainResult<Vec<RefreshToken>> {
        let ids: Vec<TokenId> = self
            .working
            .refresh_tokens
            .values()
            .filter(|token| token.user_id == user_id)
            .map(|token| token.id)
            .collect();

        let mut removed: Vec<RefreshToken> = ids
            .iter()
            .filter_map(|id| self.working.refresh_tokens.remove(id))
            .collect();
        removed.sort_by_key(|token| (token.created_at, token.id));
        Ok(removed)
    }
}

#[async_trait]
impl RevokedTokenRepository for InMemoryUnitOfWork {
    async fn exists(&mut self, id: TokenId) -> DomainResult<bool> {
        Ok(self.working.revoked_tokens.contains_key(&id))
    }

    async fn find_by_id(&mut self, id: TokenId) -> DomainResult<Option<RevokedToken>> {
        Ok(self.working.revoked_tokens.get(&id).cloned())
    }

    async fn insert(&mut self, revoked: RevokedToken) -> DomainResult<()> {
        self.working
            .revoked_tokens
            .entry(revoked.token_id)
            .or_insert(revoked);
        Ok(())
    }
}
