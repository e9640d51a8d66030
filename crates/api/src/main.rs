use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studyflow_api::config::ServerConfig;
use studyflow_api::router::build_app_router;
use studyflow_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Configuration loaded");

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = studyflow_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    studyflow_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    studyflow_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database ready");

    // Each consumer holds its own bus subscription; dropping the bus at
    // shutdown is what ends their loops.
    let event_bus = Arc::new(studyflow_events::EventBus::default());
    let persistence = tokio::spawn(studyflow_events::EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    let rewards = tokio::spawn(studyflow_events::RewardService::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Event consumers started (persistence, rewards)");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Cannot bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // The listener is closed; drain the consumers before exiting so
    // buffered events still reach the database.
    drop(event_bus);
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    let _ = tokio::time::timeout(drain, persistence).await;
    let _ = tokio::time::timeout(drain, rewards).await;
    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studyflow_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on SIGINT or, on Unix, SIGTERM. Either starts the graceful
/// drain.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
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
        () = interrupt => tracing::info!("SIGINT received, draining"),
        () = terminate => tracing::info!("SIGTERM received, draining"),
    }
}
