use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calclink::bridge::api::ApiClient;
use calclink::bridge::monitor;
use calclink::bridge::slots::SlotStore;
use calclink::config::BridgeConfig;

/// Installs a Ctrl-C/SIGTERM handler that cancels the returned token.
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!("❌ Failed to install SIGTERM handler: {}", e);
                    let _ = ctrl_c.await;
                    token_clone.cancel();
                    return;
                }
            };

            tokio::select! {
                _ = ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating shutdown");
                }
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
    });

    token
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = BridgeConfig::from_env()?;
    tracing::info!("✅ Configuration loaded successfully");

    if !config.copier_path.exists() {
        anyhow::bail!(
            "Transfer utility not found at: {}",
            config.copier_path.display()
        );
    }

    let store = SlotStore::new(&config);
    let api = ApiClient::new(&config)?;
    tracing::info!("✅ Bridge initialized, server: {}", config.server_url);
    tracing::info!("Waiting for {} connection...", config.device_name);

    let shutdown = install_signal_handler();
    monitor::run(store, api, &config, shutdown).await;

    tracing::info!("Goodbye!");
    Ok(())
}
