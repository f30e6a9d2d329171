use anyhow::Result;
use axum::{ServiceExt, body::Body};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tripkeeper::application::{
    commands::auth::TokenPolicy,
    ports::{
        security::{PasswordHasher, TokenSigner},
        time::Clock,
        transaction::TransactionRunner,
        util::IdGenerator,
    },
    services::ApplicationServices,
};
use tripkeeper::config::AppConfig;
use tripkeeper::infrastructure::{
    database,
    repositories::PostgresTransactionRunner,
    security::{password::Argon2PasswordHasher, token::BiscuitTokenSigner},
    time::SystemClock,
    util::UuidGenerator,
};
use tripkeeper::presentation::http::{routes::build_router, state::HttpState};

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let pool = database::init_pool(config.database_url()).await?;
    database::run_migrations(&pool).await?;

    let transactions: Arc<dyn TransactionRunner> = Arc::new(PostgresTransactionRunner::new(pool));
    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::default());
    let token_signer: Arc<dyn TokenSigner> = Arc::new(BiscuitTokenSigner::new(
        config.biscuit_private_key(),
        Arc::clone(&clock),
    )?);
    let ids: Arc<dyn IdGenerator> = Arc::new(UuidGenerator::default());
    let policy = TokenPolicy::new(config.access_token_ttl(), config.refresh_token_ttl())?;

    let services = Arc::new(ApplicationServices::new(
        transactions,
        password_hasher,
        token_signer,
        clock,
        ids,
        policy,
    ));

    let state = HttpState { services };

    let app = build_router(state);
    let service = app.into_service::<Body>().into_make_service();

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    let address: SocketAddr = listener.local_addr()?;
    tracing::info!(
        %address,
        access_ttl_secs = config.access_token_ttl().as_secs(),
        refresh_ttl_secs = config.refresh_token_ttl().as_secs(),
        "listening"
    );

    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,tower_http=info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
