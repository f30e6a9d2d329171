// tests/support/helpers.rs
use std::sync::Arc;

use axum::Router;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use chrono::Duration;
use serde_json::Value;
use uuid::Uuid;
use tripkeeper::application::{
    commands::auth::{AuthCommandService, LoginUserCommand, RegisterUserCommand, TokenPolicy},
    dto::TokenPairDto,
    ports::{
        security::TokenSigner,
        time::Clock,
        transaction::{TransactionRunner, UnitOfWork},
    },
    services::ApplicationServices,
};
use tripkeeper::domain::{
    token::{RefreshToken, RevocationReason, RevokedToken, TokenId},
    user::UserId,
};
use tripkeeper::infrastructure::{repositories::InMemoryTransactionRunner, util::UuidGenerator};
use tripkeeper::presentation::http::{routes::build_router, state::HttpState};

use super::mocks::{FakeTokenSigner, ManualClock, StrictPasswordHasher};

pub const ACCESS_TTL_SECS: u64 = 15 * 60;
pub const REFRESH_TTL_SECS: u64 = 24 * 60 * 60;
pub const PASSWORD: &str = "correct horse battery";

/// Auth core wired over in-memory stores with a controllable clock.
pub struct TestApp {
    pub services: Arc<ApplicationServices>,
    pub runner: InMemoryTransactionRunner,
    pub clock: Arc<ManualClock>,
    pub hasher: StrictPasswordHasher,
}

pub fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::default());
    let signer = Arc::new(FakeTokenSigner::new(Arc::clone(&clock)));
    test_app_with(clock, signer)
}

pub fn test_app_with(clock: Arc<ManualClock>, signer: Arc<dyn TokenSigner>) -> TestApp {
    let runner = InMemoryTransactionRunner::new();
    let hasher = StrictPasswordHasher::default();
    let policy = TokenPolicy::new(
        std::time::Duration::from_secs(ACCESS_TTL_SECS),
        std::time::Duration::from_secs(REFRESH_TTL_SECS),
    )
    .expect("valid policy");

    let services = Arc::new(ApplicationServices::new(
        Arc::new(runner.clone()),
        Arc::new(hasher.clone()),
        signer,
        clock.clone(),
        Arc::new(UuidGenerator::default()),
        policy,
    ));

    TestApp {
        services,
        runner,
        clock,
        hasher,
    }
}

impl TestApp {
    pub fn auth(&self) -> &AuthCommandService {
        &self.services.auth_commands
    }

    pub fn router(&self) -> Router {
        build_router(HttpState {
            services: Arc::clone(&self.services),
        })
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }

    pub async fn register(&self, email: &str) -> UserId {
        self.auth()
            .register(RegisterUserCommand {
                username: "traveller".into(),
                email: email.into(),
                password: PASSWORD.into(),
            })
            .await
            .expect("register")
            .user_id
    }

    pub async fn login(&self, email: &str) -> TokenPairDto {
        self.auth()
            .login(LoginUserCommand {
                email: email.into(),
                password: PASSWORD.into(),
            })
            .await
            .expect("login")
    }

    pub async fn register_and_login(&self, email: &str) -> (UserId, TokenPairDto) {
        let user_id = self.register(email).await;
        (user_id, self.login(email).await)
    }

    /// Read-only unit of work; dropped without commit.
    async fn peek(&self) -> Box<dyn UnitOfWork> {
        self.runner.begin().await.expect("begin")
    }

    pub async fn is_active(&self, bearer: &str) -> bool {
        let id = token_id(bearer);
        let mut uow = self.peek().await;
        uow.refresh_tokens()
            .find_by_id(id)
            .await
            .expect("find active")
            .is_some()
    }

    pub async fn revocation(&self, bearer: &str) -> Option<RevokedToken> {
        let id = token_id(bearer);
        let mut uow = self.peek().await;
        uow.revoked_tokens().find_by_id(id).await.expect("find revoked")
    }

    pub async fn revocation_reason(&self, bearer: &str) -> Option<RevocationReason> {
        self.revocation(bearer).await.map(|revoked| revoked.reason)
    }

    pub async fn active_token_count(&self, user_id: UserId) -> usize {
        // The sweep is discarded with the uncommitted unit of work.
        let mut uow = self.peek().await;
        uow.refresh_tokens()
            .delete_all_by_user(user_id)
            .await
            .expect("list active")
            .len()
    }

    /// Store a refresh token for `user_id` that expires `expires_in` from now
    /// (negative for one already past its expiry).
    pub async fn seed_refresh_token(&self, user_id: UserId, expires_in: Duration) -> String {
        let now = self.clock.now();
        let token = RefreshToken {
            id: TokenId::from_uuid(Uuid::new_v4()),
            user_id,
            expires_at: now + expires_in,
            created_at: now - Duration::hours(2),
        };
        let bearer = token.id.to_bearer();
        let mut uow = self.runner.begin().await.expect("begin");
        uow.refresh_tokens().insert(token).await.expect("insert");
        uow.commit().await.expect("commit");
        bearer
    }

    /// Write a tombstone for a token that is still active.
    pub async fn corrupt_with_tombstone(&self, bearer: &str) {
        let id = token_id(bearer);
        let mut uow = self.runner.begin().await.expect("begin");
        let token = uow
            .refresh_tokens()
            .find_by_id(id)
            .await
            .expect("find")
            .expect("token is active");
        uow.revoked_tokens()
            .insert(RevokedToken::of(&token, RevocationReason::Logout, token.created_at))
            .await
            .expect("insert tombstone");
        uow.commit().await.expect("commit");
    }
}

pub fn token_id(bearer: &str) -> TokenId {
    TokenId::from_bearer(bearer).expect("well-formed refresh token")
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Assert that a response is an error JSON body with the expected status and error string.
pub async fn assert_error_response(
    resp: axum::response::Response,
    expected_status: StatusCode,
    expected_error: &str,
) {
    assert_eq!(resp.status(), expected_status);
    let (parts, body_stream) = resp.into_parts();
    let body_bytes = body::to_bytes(body_stream, 1024 * 1024)
        .await
        .expect("read body");
    let ct = parts
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(ct.starts_with("application/json"), "unexpected content-type: {}", ct);
    let json: Value = serde_json::from_slice(&body_bytes).expect("expected valid json body for error");
    let err_field = json.get("error").and_then(|v| v.as_str()).unwrap_or("");
    let msg_field = json.get("message").and_then(|v| v.as_str()).unwrap_or("");
    assert_eq!(err_field, expected_error, "unexpected error field: {}", err_field);
    assert!(!msg_field.is_empty(), "expected non-empty message field");
}
