// src/domain/token/mod.rs
pub mod entity;
pub mod repository;
pub mod value_objects;

pub use entity::{RefreshToken, RevokedToken};
pub use repository::{RefreshTokenRepository, RevokedTokenRepository};
pub use value_objects::{RevocationReason, TokenId};
