//! Campus Live server binary.
//!
//! Starts an axum HTTP server with structured logging, database
//! initialization, the live announcement channel and graceful shutdown on
//! SIGTERM/SIGINT.

use campus_auth::TokenService;
use campus_live::LiveService;
use campus_server::{app, config, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("CAMPUS_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration, the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Initialize database
    let pool = campus_db::open_database(
        &config.database.path,
        campus_db::DbRuntimeSettings {
            busy_timeout_ms: config.database.busy_timeout_ms,
            pool_max_size: config.database.pool_max_size,
        },
    )
    .expect("failed to open database, check database.path in config");

    // Token signing
    let secret = if config.auth.jwt_secret.trim().is_empty() {
        tracing::warn!("auth.jwt_secret is not set, using a random secret; tokens will not survive a restart");
        uuid::Uuid::new_v4().simple().to_string()
    } else {
        config.auth.jwt_secret.clone()
    };
    let tokens = TokenService::new(&secret, config.auth.token_ttl_hours);

    // Live channel, seeded once
    let store = config
        .live
        .seed_store()
        .expect("invalid [[live.seed]] entry, every seed needs a non-blank event and update");
    tracing::info!(records = store.len(), "seeded live announcement store");
    let live = LiveService::with_store(store, config.live.queue_capacity);

    let state = AppState {
        pool,
        live: Arc::new(live),
        tokens: Arc::new(tokens),
    };

    // Build application
    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting campus live server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address, is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");

    tracing::info!("campus live server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
