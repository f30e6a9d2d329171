pub mod auth;

pub use auth::{AuthenticatedUser, RegisteredUserDto, TokenPairDto};
