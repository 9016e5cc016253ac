use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// The relay server's configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The upstream AI answering service, if configured.
    pub ai_relay_url: Option<String>,
    /// The timeout for a single AI relay request.
    pub ai_relay_timeout: Duration,
    /// The maximum number of entries kept per message/AI-response queue.
    pub message_queue_cap: usize,
    /// Whether `get_messages` drains the queue on read.
    pub trim_messages_on_read: bool,
    /// How often expired sessions are swept.
    pub session_sweep_interval: Duration,
}

impl ServerConfig {
    /// Creates a new `ServerConfig` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ServerConfig`.
    pub fn from_env() -> Result<Self> {
        let bind_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse()
            .context("Invalid SERVER_ADDR")?;

        let ai_relay_url = env::var("AI_RELAY_URL").ok().filter(|s| !s.is_empty());

        let ai_relay_timeout_secs: u64 = env::var("AI_RELAY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid AI_RELAY_TIMEOUT_SECS")?;

        let message_queue_cap: usize = env::var("MESSAGE_QUEUE_CAP")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .context("Invalid MESSAGE_QUEUE_CAP")?;

        let trim_messages_on_read: bool = env::var("TRIM_MESSAGES_ON_READ")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .context("Invalid TRIM_MESSAGES_ON_READ")?;

        let session_sweep_interval_secs: u64 = env::var("SESSION_SWEEP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("Invalid SESSION_SWEEP_INTERVAL_SECS")?;

        Ok(Self {
            bind_addr,
            ai_relay_url,
            ai_relay_timeout: Duration::from_secs(ai_relay_timeout_secs),
            message_queue_cap,
            trim_messages_on_read,
            session_sweep_interval: Duration::from_secs(session_sweep_interval_secs),
        })
    }
}

/// The bridge process's configuration.
#[derive(Clone)]
pub struct BridgeConfig {
    /// The path to the external file-transfer utility.
    pub copier_path: PathBuf,
    /// The device name the transfer utility targets.
    pub device_name: String,
    /// The relay server's base URL.
    pub server_url: String,
    /// The staging directory for slot uploads.
    pub send_dir: PathBuf,
    /// The staging directory for slot downloads.
    pub receive_dir: PathBuf,
    /// The poll loop's tick interval.
    pub tick_interval: Duration,
    /// The throttled cadence for device presence probes.
    pub presence_interval: Duration,
    /// The timeout for a single server request.
    pub http_timeout: Duration,
}

impl BridgeConfig {
    /// Creates a new `BridgeConfig` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `BridgeConfig`.
    pub fn from_env() -> Result<Self> {
        let copier_path = PathBuf::from(
            env::var("COPIER_PATH").unwrap_or_else(|_| "./publish/MediaDeviceCopier".to_string()),
        );

        let device_name =
            env::var("DEVICE_NAME").unwrap_or_else(|_| "TI-84 Plus CE".to_string());

        let server_url =
            env::var("SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());

        let tick_interval_ms: u64 = env::var("TICK_INTERVAL_MS")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("Invalid TICK_INTERVAL_MS")?;

        let presence_interval_ms: u64 = env::var("PRESENCE_INTERVAL_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse()
            .context("Invalid PRESENCE_INTERVAL_MS")?;

        let http_timeout_secs: u64 = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("Invalid HTTP_TIMEOUT_SECS")?;

        Ok(Self {
            copier_path,
            device_name,
            server_url: server_url.trim_end_matches('/').to_string(),
            send_dir: PathBuf::from(env::var("SEND_DIR").unwrap_or_else(|_| "./send".to_string())),
            receive_dir: PathBuf::from(
                env::var("RECEIVE_DIR").unwrap_or_else(|_| "./receive".to_string()),
            ),
            tick_interval: Duration::from_millis(tick_interval_ms),
            presence_interval: Duration::from_millis(presence_interval_ms),
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}
