//! Pulso server entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulso_api::{
    middleware::{identity_middleware, session_middleware, AppState},
    router as api_router,
};
use pulso_common::Config;
use pulso_core::{
    GeolocationService, IpLookupLocator, MapService, ReportService, SessionRegistry,
    TranslationConfig, TranslationService, VoteService,
};
use pulso_db::repositories::ReportRepository;

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
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulso=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting pulso server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = pulso_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    pulso_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let report_repo = ReportRepository::new(Arc::clone(&db));

    // Session registry shared between the report and vote services
    let sessions = SessionRegistry::new(Duration::from_secs(config.session.ttl_seconds));

    // Initialize services
    let report_service = ReportService::new(report_repo.clone(), sessions.clone());
    let vote_service = VoteService::new(report_repo, sessions.clone());
    let map_service = MapService::new(config.map.clone());

    let locator = Arc::new(IpLookupLocator::new(config.geolocation.provider_url.clone()));
    let geolocation_service = GeolocationService::new(locator, &config.geolocation, &config.map);

    // Translation is optional, based on config
    let translation_service = if config.translation.enabled {
        match TranslationConfig::from_settings(&config.translation) {
            Ok(translation_config) => Some(TranslationService::new(translation_config)),
            Err(e) => {
                tracing::warn!(error = %e, "Translation disabled: invalid configuration");
                None
            }
        }
    } else {
        None
    };

    // Evict abandoned sessions in the background
    let sweep_sessions = sessions.clone();
    let session_ttl = config.session.ttl_seconds;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(session_ttl.max(60)));
        loop {
            interval.tick().await;
            sweep_sessions.purge_expired().await;
            let live = sweep_sessions.len().await;
            tracing::trace!(live, "Swept expired sessions");
        }
    });

    // Create app state
    let state = AppState {
        report_service,
        vote_service,
        map_service,
        geolocation_service,
        translation_service,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn(session_middleware))
        .layer(middleware::from_fn(identity_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
