use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::registry::Registry;
use crate::relay::AiRelay;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The session and message registry.
    pub registry: Arc<Registry>,
    /// The AI relay client.
    pub relay: Arc<AiRelay>,
    /// The server's configuration.
    pub config: ServerConfig,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The server's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let registry = Arc::new(Registry::new(
            config.message_queue_cap,
            config.trim_messages_on_read,
        ));
        tracing::info!(
            "✅ Registry initialized (queue cap {}, trim on read: {})",
            config.message_queue_cap,
            config.trim_messages_on_read
        );

        let relay = Arc::new(AiRelay::new(
            config.ai_relay_url.clone(),
            config.ai_relay_timeout,
        )?);
        match &config.ai_relay_url {
            Some(url) => tracing::info!("✅ AI relay configured: {}", url),
            None => tracing::warn!("⚠️ AI relay not configured (AI_RELAY_URL unset)"),
        }

        Ok(AppState {
            registry,
            relay,
            config: config.clone(),
        })
    }
}
