//! Gavel server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use gavel_api::{middleware::AppState, router as api_router};
use gavel_common::Config;
use gavel_core::{
    ActionExecutor, DeadlineProcessor, OverrideService, StatusService, TracingSink,
    ViolationService,
};
use gavel_db::repositories::{AccountRepository, EnforcementRepository, ViolationRepository};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gavel=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting gavel server...");

    // Load configuration
    let config = Arc::new(Config::load()?);

    // Connect to database
    let db = gavel_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    gavel_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let account_repo = AccountRepository::new(Arc::clone(&db));
    let enforcement_repo = EnforcementRepository::new(Arc::clone(&db));
    let violation_repo = ViolationRepository::new(Arc::clone(&db));

    // Initialize services
    let executor = ActionExecutor::new(
        Arc::clone(&db),
        account_repo.clone(),
        enforcement_repo.clone(),
        Arc::new(TracingSink),
    );
    let sweep = DeadlineProcessor::new(
        account_repo.clone(),
        enforcement_repo.clone(),
        executor.clone(),
        config.sweep.clone(),
    );
    let violation_service = ViolationService::new(
        account_repo.clone(),
        violation_repo.clone(),
        executor.clone(),
        config.sweep.escalation_window_hours,
    );
    let override_service = OverrideService::new(account_repo.clone(), enforcement_repo.clone());
    let status_service = StatusService::new(account_repo, violation_repo, enforcement_repo);

    // Create app state
    let state = AppState {
        violation_service,
        executor,
        sweep,
        status_service,
        override_service,
        config: Arc::clone(&config),
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gavel_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
