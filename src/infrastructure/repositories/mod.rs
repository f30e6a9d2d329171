// src/infrastructure/repositories/mod.rs
mod error;
mod memory;
mod postgres_refresh_token;
mod postgres_revoked_token;
mod postgres_unit_of_work;
mod postgres_user;

pub use error::map_sqlx;
pub use memory::{InMemoryTransactionRunner, InMemoryUnitOfWork};
pub use postgres_unit_of_work::{PostgresTransactionRunner, PostgresUnitOfWork};
