use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calclink::app::build_router;
use calclink::config::ServerConfig;
use calclink::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    let state = AppState::new(&config)?;
    tracing::info!("✅ AppState initialized");

    let sweep_interval = config.session_sweep_interval;
    let sweep_registry = state.registry.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(sweep_interval).await;
            tracing::info!("🧹 Running scheduled cleanup of expired sessions...");
            let removed = sweep_registry.expire_sessions(chrono::Utc::now());
            tracing::info!("✅ Cleanup job completed ({} removed)", removed);
        }
    });

    let app = build_router(state);

    tracing::info!("🚀 Server listening on http://{}", config.bind_addr);
    tracing::info!("✅ Background session sweeper started");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
