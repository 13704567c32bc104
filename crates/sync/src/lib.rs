//! Draft autosave and attachment uploads for the journal editing client.
//!
//! Two independent engines share nothing but the transport:
//!
//! - [`DraftSyncEngine`] polls the draft fields on a fixed interval and saves
//!   them when they changed since the last successful save.
//! - [`UploadPipeline`] hashes selected files, drops duplicates and uploads
//!   each new file chunk by chunk.
//!
//! The editing surface is reached through the traits in [`host`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use journal_client::JournalClient;
//! use journal_sync::{NoProgress, SelectedFile, SyncConfig, UploadPipeline};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::default();
//! let client = Arc::new(JournalClient::new("http://localhost:8848/journal?apikey=k")?);
//! let pipeline = UploadPipeline::new(config.upload, client, Arc::new(NoProgress))?;
//! pipeline.admit(vec![SelectedFile::new("notes.txt", b"hello".to_vec())]);
//! pipeline.wait_idle().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod draft;
pub mod error;
pub mod host;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use config::{DraftConfig, SyncConfig, UploadConfig};
pub use draft::{DraftSyncEngine, DraftSyncHandle, TickOutcome};
pub use error::SyncError;
pub use host::{DraftFields, NoProgress, ProgressHandle, ProgressReporter, StatusDisplay};
pub use upload::{
    Admission, Attachment, AttachmentRegistry, AttachmentSummary, SelectedFile, TransferState,
    UploadPipeline,
};
