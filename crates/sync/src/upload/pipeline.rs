use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use journal_client::AttachmentTransport;
use journal_core::ContentHash;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use super::registry::{AttachmentRegistry, AttachmentSummary, NextChunk};
use crate::config::UploadConfig;
use crate::error::SyncError;
use crate::host::ProgressReporter;

/// A file picked by the user, read fully into memory.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Display name.
    pub name: String,
    /// Raw content.
    pub bytes: Bytes,
}

impl SelectedFile {
    /// Wrap in-memory content.
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read the file at `path`. The display name is the final path component.
    pub async fn read(path: &Path) -> Result<Self, SyncError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| SyncError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Ok(Self::new(name, bytes))
    }
}

/// Result of admitting one selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// New content; its upload starts after `delay`.
    Registered {
        /// Content address.
        hash: ContentHash,
        /// Stagger delay before the first chunk.
        delay: Duration,
    },
    /// Content already known to this session; nothing was done.
    Duplicate {
        /// Content address.
        hash: ContentHash,
    },
}

impl Admission {
    /// Content address of the admitted file.
    pub fn hash(&self) -> &ContentHash {
        match self {
            Self::Registered { hash, .. } | Self::Duplicate { hash } => hash,
        }
    }
}

struct Inner {
    config: UploadConfig,
    transport: Arc<dyn AttachmentTransport>,
    reporter: Arc<dyn ProgressReporter>,
    registry: AttachmentRegistry,
}

/// Hashes, dedupes and uploads selected files chunk by chunk.
///
/// Each registered attachment runs in its own task. Chunks of one attachment
/// are sent strictly in sequence; different attachments overlap freely.
pub struct UploadPipeline {
    inner: Arc<Inner>,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl UploadPipeline {
    /// Create a pipeline with an empty registry.
    ///
    /// Fails with [`SyncError::Config`] when `config` is invalid.
    pub fn new(
        config: UploadConfig,
        transport: Arc<dyn AttachmentTransport>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                reporter,
                registry: AttachmentRegistry::new(),
            }),
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
        })
    }

    /// The attachments of this session.
    pub fn registry(&self) -> &AttachmentRegistry {
        &self.inner.registry
    }

    /// Views of every attachment in admission order.
    pub fn attachments(&self) -> Vec<AttachmentSummary> {
        self.inner.registry.summaries()
    }

    /// Admit one selection of files, in order.
    ///
    /// Known content is skipped. Each new registration starts uploading one
    /// stagger step after the previous new registration of this selection.
    /// Must be called from within a tokio runtime.
    pub fn admit(&self, files: Vec<SelectedFile>) -> Vec<Admission> {
        let step = self.inner.config.stagger();
        let mut headstart = Duration::ZERO;
        let mut admissions = Vec::with_capacity(files.len());

        for file in files {
            let hash = ContentHash::of(&file.bytes);
            let registered = self.inner.registry.register(
                &file.name,
                hash.clone(),
                file.bytes,
                self.inner.config.chunk_size,
                self.inner.reporter.as_ref(),
            );
            if !registered {
                debug!(name = %file.name, hash = %hash, "attachment already queued");
                admissions.push(Admission::Duplicate { hash });
                continue;
            }

            info!(name = %file.name, hash = %hash, delay = ?headstart, "attachment queued");
            self.spawn_upload(hash.clone(), headstart);
            admissions.push(Admission::Registered {
                hash,
                delay: headstart,
            });
            headstart += step;
        }
        admissions
    }

    /// Read `paths` and admit them as one selection.
    ///
    /// Fails before admitting anything when a file cannot be read.
    pub async fn admit_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Admission>, SyncError> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(SelectedFile::read(path.as_ref()).await?);
        }
        Ok(self.admit(files))
    }

    /// Wait until every attachment admitted so far reached a terminal state.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Stop every upload task and wait for them to end.
    ///
    /// Attachments that were still sending are marked failed.
    pub async fn shutdown(self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }

    fn spawn_upload(&self, hash: ContentHash, delay: Duration) {
        let inner = Arc::clone(&self.inner);
        let token = self.token.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                () = token.cancelled() => {
                    debug!(hash = %hash, "upload cancelled");
                    inner.registry.chunk_failed(&hash);
                }
                () = inner.drive(&hash, delay) => {}
            }
        });
    }
}

impl Inner {
    /// Send every chunk of `hash` in order until exhaustion or the first failure.
    async fn drive(&self, hash: &ContentHash, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        loop {
            let chunk = match self.registry.next_chunk(hash) {
                NextChunk::Send(chunk) => chunk,
                NextChunk::Finished => {
                    info!(hash = %hash, "attachment uploaded");
                    return;
                }
                NextChunk::Stopped => return,
            };

            let sent = chunk.len();
            match self.transport.upload_chunk(hash, chunk).await {
                Ok(_) => self.registry.chunk_accepted(hash, sent),
                Err(e) => {
                    match e.payload() {
                        Some(payload) => error!(hash = %hash, %payload, "attachment chunk rejected"),
                        None => warn!(
                            hash = %hash,
                            error = %e,
                            retryable = e.is_retryable(),
                            "attachment chunk failed; not retrying"
                        ),
                    }
                    self.registry.chunk_failed(hash);
                    return;
                }
            }
        }
    }
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("config", &self.inner.config)
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}
