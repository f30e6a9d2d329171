// src/presentation/http/controllers/auth.rs
use crate::application::{
    commands::auth::{LoginUserCommand, LogoutCommand, RefreshTokenCommand, RegisterUserCommand},
    dto::{AuthenticatedUser, RegisteredUserDto, TokenPairDto},
};
use crate::presentation::http::error::{HttpError, HttpResult, IntoHttpResult};
use crate::presentation::http::extractors::Authenticated;
use crate::presentation::http::state::HttpState;
use axum::{Extension, Json, http::StatusCode};
use serde::Deserialize;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

pub async fn register(
    Extension(state): Extension<HttpState>,
    Json(payload): Json<RegisterRequest>,
) -> HttpResult<(StatusCode, Json<RegisteredUserDto>)> {
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(HttpError::bad_request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let command = RegisterUserCommand {
        username: payload.username,
        email: payload.email,
        password: payload.password,
    };

    let registered = state
        .services
        .auth_commands
        .register(command)
        .await
        .into_http()?;

    Ok((StatusCode::CREATED, Json(registered)))
}

pub async fn login(
    Extension(state): Extension<HttpState>,
    Json(payload): Json<LoginRequest>,
) -> HttpResult<Json<TokenPairDto>> {
    let command = LoginUserCommand {
        email: payload.email,
        password: payload.password,
    };

    state
        .services
        .auth_commands
        .login(command)
        .await
        .into_http()
        .map(Json)
}

pub async fn refresh(
    Extension(state): Extension<HttpState>,
    Json(payload): Json<RefreshRequest>,
) -> HttpResult<Json<TokenPairDto>> {
    state
        .services
        .auth_commands
        .refresh(RefreshTokenCommand {
            refresh_token: payload.refresh_token,
        })
        .await
        .into_http()
        .map(Json)
}

pub async fn logout(
    Extension(state): Extension<HttpState>,
    Json(payload): Json<RefreshRequest>,
) -> HttpResult<StatusCode> {
    state
        .services
        .auth_commands
        .logout(LogoutCommand {
            refresh_token: payload.refresh_token,
        })
        .await
        .into_http()?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn profile(Authenticated(user): Authenticated) -> Json<AuthenticatedUser> {
    Json(user)
}
