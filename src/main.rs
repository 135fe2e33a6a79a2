//! TaskHub Server — authentication and task-management backend.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("TASKHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TaskHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = taskhub_database::DatabasePool::connect(&config.database).await?;
    taskhub_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = taskhub_cache::CacheManager::new(&config.cache).await?;

    // ── Step 3: Auth system ──────────────────────────────────────
    tracing::info!("Initializing authentication system");
    let user_repo = Arc::new(taskhub_database::UserRepository::new(db.pool().clone()));
    let store: Arc<dyn taskhub_entity::user::CredentialStore> = user_repo.clone();

    let password_hasher = Arc::new(taskhub_auth::PasswordHasher::new());
    let password_validator = Arc::new(taskhub_auth::PasswordValidator::new(&config.auth));
    let jwt_encoder = Arc::new(taskhub_auth::JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(taskhub_auth::JwtDecoder::new(&config.auth));

    let session_resolver = Arc::new(taskhub_auth::SessionResolver::new(
        taskhub_auth::JwtDecoder::new(&config.auth),
        Arc::clone(&store),
        cache.clone(),
        &config.auth,
        config.cache.default_ttl_seconds,
    ));
    let rotation_coordinator = Arc::new(taskhub_auth::RotationCoordinator::new(
        taskhub_auth::JwtDecoder::new(&config.auth),
        taskhub_auth::JwtEncoder::new(&config.auth),
        Arc::clone(&store),
        &config.auth,
    ));
    let session_manager = Arc::new(taskhub_auth::SessionManager::new(
        Arc::clone(&store),
        cache.clone(),
        taskhub_auth::JwtEncoder::new(&config.auth),
        taskhub_auth::PasswordHasher::new(),
        &config.auth,
    ));

    // ── Step 4: HTTP server ──────────────────────────────────────
    let state = taskhub_api::AppState {
        config: Arc::new(config.clone()),
        db_pool: db.pool().clone(),
        cache,
        jwt_encoder,
        jwt_decoder,
        password_hasher,
        password_validator,
        session_resolver,
        rotation_coordinator,
        session_manager,
        role_gate: taskhub_auth::RoleGate::new(),
        user_repo,
    };

    let app = taskhub_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("TaskHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    db.close().await;
    tracing::info!("TaskHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
