use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;

use crate::bridge::dispatch::SlotSnapshot;
use crate::config::BridgeConfig;

/// The auth request slot (`LOGIN`/`SIGNUP` envelopes).
pub const SLOT_AUTH: &str = "Str0";
/// The outgoing message request slot.
pub const SLOT_OUTGOING: &str = "Str1";
/// The received-message response slot.
pub const SLOT_RECEIVED: &str = "Str3";
/// The AI question request slot.
pub const SLOT_AI_QUESTION: &str = "Str4";
/// The AI answer response slot.
pub const SLOT_AI_ANSWER: &str = "Str5";
/// The session-id slot: response on auth, request echo everywhere else.
pub const SLOT_SESSION: &str = "Str7";

/// A slot transfer error.
#[derive(Error, Debug)]
pub enum SlotError {
    /// The transfer utility could not be executed or staging I/O failed.
    #[error("transfer utility I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transfer utility exited with a failure status.
    #[error("transfer utility exited with {status}: {stderr}")]
    Utility { status: ExitStatus, stderr: String },
}

/// Reads and writes named text slots through the external transfer
/// utility.
///
/// Every operation is a full subprocess round trip. Transient staging
/// files are removed on every exit path so stale data never contaminates
/// the next poll.
pub struct SlotStore {
    copier: PathBuf,
    device: String,
    send_dir: PathBuf,
    receive_dir: PathBuf,
}

impl SlotStore {
    /// Creates a new `SlotStore` from the bridge configuration.
    pub fn new(config: &BridgeConfig) -> Self {
        Self {
            copier: config.copier_path.clone(),
            device: config.device_name.clone(),
            send_dir: config.send_dir.clone(),
            receive_dir: config.receive_dir.clone(),
        }
    }

    async fn run_copier(&self, args: &[&str]) -> Result<String, SlotError> {
        tracing::debug!("exec: {} {}", self.copier.display(), args.join(" "));

        let output = Command::new(&self.copier).args(args).output().await?;

        if !output.status.success() {
            return Err(SlotError::Utility {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Probes whether the device is currently connected.
    ///
    /// Transport errors are logged and read as "not present"; the poll
    /// loop retries on its next probe.
    pub async fn presence(&self) -> bool {
        match self.run_copier(&["list-devices"]).await {
            Ok(stdout) => stdout.contains(&self.device),
            Err(e) => {
                tracing::error!("❌ Device probe failed: {}", e);
                false
            }
        }
    }

    /// Reads all request slots in one download round trip.
    ///
    /// Transfer failures degrade to an empty snapshot; staged files are
    /// removed whether or not the download succeeded.
    pub async fn snapshot(&self) -> SlotSnapshot {
        if let Err(e) = tokio::fs::create_dir_all(&self.receive_dir).await {
            tracing::error!("❌ Could not create receive dir: {}", e);
            return SlotSnapshot::default();
        }

        let receive_dir = self.receive_dir.to_string_lossy().to_string();
        let download = self
            .run_copier(&[
                "download-files",
                "-n",
                &self.device,
                "-s",
                "RAM",
                "-t",
                &receive_dir,
            ])
            .await;

        let snapshot = match download {
            Ok(_) => SlotSnapshot {
                auth: self.read_staged(SLOT_AUTH).await,
                outgoing: self.read_staged(SLOT_OUTGOING).await,
                ai_question: self.read_staged(SLOT_AI_QUESTION).await,
                session: self.read_staged(SLOT_SESSION).await,
            },
            Err(e) => {
                tracing::error!("❌ Slot download failed: {}", e);
                SlotSnapshot::default()
            }
        };

        self.cleanup_dir(&self.receive_dir).await;

        snapshot
    }

    /// Finds a downloaded `.txt` slot file by case-insensitive filename
    /// prefix and reads its content. Other device files (programs,
    /// pictures) share the download and are skipped.
    async fn read_staged(&self, slot: &str) -> Option<String> {
        let prefix = slot.to_uppercase();

        let mut entries = match tokio::fs::read_dir(&self.receive_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("❌ Could not scan receive dir: {}", e);
                return None;
            }
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_uppercase();
            if !name.starts_with(&prefix) || !name.ends_with(".TXT") {
                continue;
            }

            match tokio::fs::read_to_string(entry.path()).await {
                Ok(content) => return Some(content),
                Err(e) => {
                    tracing::error!("❌ Error reading {}: {}", name, e);
                    return None;
                }
            }
        }

        None
    }

    /// Writes a value into a named slot.
    ///
    /// The staged file is removed on success and failure alike.
    pub async fn write_slot(&self, slot: &str, value: &str) -> Result<(), SlotError> {
        tokio::fs::create_dir_all(&self.send_dir).await?;

        let staged = self.send_dir.join(format!("{slot}.txt"));
        tokio::fs::write(&staged, value).await?;

        let send_dir = self.send_dir.to_string_lossy().to_string();
        let result = self
            .run_copier(&[
                "upload-files",
                "-n",
                &self.device,
                "-s",
                &send_dir,
                "-t",
                "RAM",
                "-se",
            ])
            .await;

        if let Err(e) = tokio::fs::remove_file(&staged).await {
            tracing::warn!("⚠️ Could not remove staged file: {}", e);
        }

        result.map(|_| ())
    }

    /// Clears a slot by writing an empty value, signalling "consumed".
    ///
    /// Failures are logged; the next tick's handler clears again.
    pub async fn clear_slot(&self, slot: &str) {
        match self.write_slot(slot, "").await {
            Ok(()) => tracing::debug!("Cleared {} on device", slot),
            Err(e) => tracing::error!("❌ Error clearing {}: {}", slot, e),
        }
    }

    async fn cleanup_dir(&self, dir: &Path) {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
            return;
        };

        while let Ok(Some(entry)) = entries.next_entry().await {
            if let Err(e) = tokio::fs::remove_file(entry.path()).await {
                tracing::warn!(
                    "⚠️ Could not remove {}: {}",
                    entry.path().display(),
                    e
                );
            }
        }
    }
}
