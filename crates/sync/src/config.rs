use std::time::Duration;

use journal_core::DEFAULT_CHUNK_SIZE;
use serde::Deserialize;

use crate::error::SyncError;

/// Top-level configuration for the journal client, usually loaded from TOML.
///
/// # Example
///
/// ```toml
/// page_url = "http://localhost:8848/journal?apikey=secret"
///
/// [draft]
/// interval_ms = 2500
///
/// [upload]
/// chunk_size = 125000
/// stagger_ms = 200
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncConfig {
    /// URL of the editing page. Endpoints resolve relative to it.
    #[serde(default)]
    pub page_url: Option<String>,
    /// Optional per-request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Draft autosave settings.
    #[serde(default)]
    pub draft: DraftConfig,
    /// Attachment upload settings.
    #[serde(default)]
    pub upload: UploadConfig,
}

impl SyncConfig {
    /// Check every value that would make the engines misbehave.
    pub fn validate(&self) -> Result<(), SyncError> {
        self.draft.validate()?;
        self.upload.validate()?;
        if self.request_timeout_secs == Some(0) {
            return Err(SyncError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The configured request timeout.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Settings of the draft sync engine.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    /// Change-detection interval in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Skip ticks while a save is still in flight.
    ///
    /// Off by default: a slow save may overlap with the save started by the
    /// next tick, and both may carry the same (possibly empty) draft id.
    #[serde(default)]
    pub serialize_saves: bool,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            serialize_saves: false,
        }
    }
}

impl DraftConfig {
    /// Change-detection interval.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject a zero interval.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.interval_ms == 0 {
            return Err(SyncError::Config(
                "draft.interval_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Settings of the attachment upload pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Delay between the start of consecutive uploads of one selection, in
    /// milliseconds.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            stagger_ms: default_stagger_ms(),
        }
    }
}

impl UploadConfig {
    /// Stagger step between uploads.
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    /// Reject a zero chunk size.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.chunk_size == 0 {
            return Err(SyncError::Config(
                "upload.chunk_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_interval_ms() -> u64 {
    2500
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_stagger_ms() -> u64 {
    200
}
