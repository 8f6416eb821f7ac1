use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use taskboard::{
    AppState,
    auth::notifier_from_env,
    config::{Config, StoreBackend},
    create_router,
    store::{MemoryStore, PgStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const RESET_PURGE_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() {
    // logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // configuration
    let config = Config::from_env().expect("Failed to load configuration");
    let notifier = notifier_from_env();

    let state = match config.store_backend {
        StoreBackend::Postgres => {
            // connection pool
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'taskboard_backend';")
                            .await?;
                        Ok(())
                    })
                })
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to Postgres");

            let store = Arc::new(PgStore::new(pool));
            store.migrate().await.expect("Failed to run migrations");
            AppState::new(config, store, notifier)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, data is lost on restart");
            AppState::new(config, Arc::new(MemoryStore::new()), notifier)
        }
    }
    .expect("Failed to initialize application state");

    state.resets.spawn_purger(RESET_PURGE_INTERVAL);

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    let app = create_router(state);

    // serve
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Failed to start server");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
