//! HTTP router and server bootstrap.

use std::sync::Arc;

use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::auth;
use super::task_store::{create_task_store, TaskStore};
use super::tasks;
use super::types::HealthResponse;
use crate::config::Config;
use crate::task::date;

/// Source of "today". Injected so handlers are deterministic under test.
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Task storage backend
    pub store: Arc<dyn TaskStore>,
    pub clock: Clock,
}

impl AppState {
    /// State using the local calendar date.
    pub fn new(config: Config, store: Arc<dyn TaskStore>) -> Self {
        Self {
            config,
            store,
            clock: Arc::new(date::today),
        }
    }

    /// Replace the clock, e.g. with a fixed date in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }
}

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/signin", post(auth::signin))
        .route("/api/nextdate", get(tasks::next_date));

    let protected_routes = Router::new()
        .nest("/api", tasks::routes())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback_service(ServeDir::new(&state.config.web_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn TaskStore> =
        Arc::from(create_task_store(config.store_type, config.db_path.clone()).await?);
    if store.is_persistent() {
        tracing::info!("Using SQLite task store at {}", config.db_path.display());
    } else {
        tracing::warn!("Using in-memory task store; tasks are lost on restart");
    }
    if config.auth.auth_required() {
        tracing::info!("Authentication enabled");
    } else {
        tracing::info!("Authentication disabled (TODO_PASSWORD not set)");
    }

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        persistent_store: state.store.is_persistent(),
        auth_required: state.config.auth.auth_required(),
    })
}
