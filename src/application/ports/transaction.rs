// src/application/ports/transaction.rs
use crate::{
    application::ApplicationResult,
    domain::{
        token::{RefreshTokenRepository, RevokedTokenRepository},
        user::UserRepository,
    },
};
use async_trait::async_trait;
use std::{future::Future, pin::Pin};

pub type UnitOfWorkFuture<'t, T> = Pin<Box<dyn Future<Output = ApplicationResult<T>> + Send + 't>>;

/// One transactional view over every store the auth core touches.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] must discard
/// all of its writes; this is what makes a cancelled request safe.
#[async_trait]
pub trait UnitOfWork: Send {
    fn users(&mut self) -> &mut dyn UserRepository;

    fn refresh_tokens(&mut self) -> &mut dyn RefreshTokenRepository;

    fn revoked_tokens(&mut self) -> &mut dyn RevokedTokenRepository;

    async fn commit(self: Box<Self>) -> ApplicationResult<()>;

    async fn rollback(self: Box<Self>) -> ApplicationResult<()>;
}

#[async_trait]
pub trait TransactionRunner: Send + Sync {
    async fn begin(&self) -> ApplicationResult<Box<dyn UnitOfWork>>;
}

impl dyn TransactionRunner {
    /// Run `work` inside a fresh unit of work. Commits when it returns `Ok`,
    /// otherwise rolls back and hands the original error back unchanged.
    ///
    /// The closure must only capture owned data; the only borrow it receives
    /// is the unit of work itself.
    pub async fn run<T, F>(&self, work: F) -> ApplicationResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut dyn UnitOfWork) -> UnitOfWorkFuture<'t, T> + Send,
    {
        let mut uow = self.begin().await?;

        let outcome = work(&mut *uow).await;

        match outcome {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed after unit of work error");
                }
                Err(err)
            }
        }
    }
}
