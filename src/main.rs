use std::sync::Arc;
use swearjar_gateway::{build_router, AppConfig, AppError, AppState, BackendClient};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swearjar_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting SwearJar gateway");

    let config = AppConfig::from_env()?;
    let backend = Arc::new(BackendClient::new(&config)?);
    let bind_addr = config.bind_addr.clone();
    info!(backend_url = %config.backend_url, production = config.production, "Configuration loaded");

    let app_state = AppState::new(config, backend);
    let app = build_router(app_state)?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", bind_addr, e)))?;
    info!("Server running on http://{}", bind_addr);

    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server error");
        AppError::Internal
    })
}
