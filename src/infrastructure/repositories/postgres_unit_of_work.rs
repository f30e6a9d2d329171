// src/infrastructure/repositories/postgres_unit_of_work.rs
use super::map_sqlx;
use crate::{
    application::{
        ApplicationResult,
        error::ApplicationError,
        ports::transaction::{TransactionRunner, UnitOfWork},
    },
    domain::{
        token::{RefreshTokenRepository, RevokedTokenRepository},
        user::UserRepository,
    },
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

/// Opens one database transaction per unit of work.
#[derive(Clone)]
pub struct PostgresTransactionRunner {
    pool: PgPool,
}

impl PostgresTransactionRunner {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRunner for PostgresTransactionRunner {
    async fn begin(&self) -> ApplicationResult<Box<dyn UnitOfWork>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|err| ApplicationError::from(map_sqlx(err)))?;

        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

/// All three stores over a single `sqlx` transaction. Dropping it without a
/// commit rolls the transaction back.
pub struct PostgresUnitOfWork {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
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
        let Self { tx } = *self;
        tx.commit()
            .await
            .map_err(|err| ApplicationError::from(map_sqlx(err)))
    }

    async fn rollback(self: Box<Self>) -> ApplicationResult<()> {
        let Self { tx } = *self;
        tx.rollback()
            .await
            .map_err(|err| ApplicationError::from(map_sqlx(err)))
    }
}
