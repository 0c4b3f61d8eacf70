//! Farm Weather service - backend server

use std::{sync::Arc, time::Duration};

use farm_weather_backend::{
    config::StoreBackend,
    create_app,
    external::OpenWeatherMapClient,
    scheduler::Scheduler,
    store::{DocumentStore, MemoryDocumentStore, PgDocumentStore},
    AppState, Config,
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "fw_server=debug,farm_weather_backend=debug,tower_http=debug,sqlx=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm Weather Server");
    tracing::info!("Environment: {}", config.environment);

    if config.weather.api_key.is_empty() {
        tracing::warn!("No weather API key configured; update cycles will fail until one is set");
    }

    let store = connect_store(&config).await?;

    let provider = Arc::new(OpenWeatherMapClient::with_base_url(
        config.weather.api_key.clone(),
        config.weather.api_endpoint.clone(),
        Duration::from_secs(config.weather.timeout_secs),
    )?);

    let state = AppState::new(config.clone(), store, provider);

    let scheduler = Scheduler::new(Arc::clone(&state.pipeline), state.settings.clone()).start();

    // Build application
    let app = create_app(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopping scheduler");
    scheduler.shutdown().await;

    Ok(())
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let url = config
                .store
                .url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.url is required for the postgres backend"))?;

            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.store.max_connections)
                .min_connections(config.store.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(url)
                .await?;
            tracing::info!("Database connection established");

            let store = PgDocumentStore::new(pool);

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                store.migrate().await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
