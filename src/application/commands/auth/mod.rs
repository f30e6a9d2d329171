// src/application/commands/auth/mod.rs
mod issue;
mod login;
mod logout;
mod refresh;
mod register;
mod service;

pub use issue::TokenPolicy;
pub use login::LoginUserCommand;
pub use logout::LogoutCommand;
pub use refresh::RefreshTokenCommand;
pub use register::RegisterUserCommand;
pub use service::AuthCommandService;
