use async_trait::async_trait;
use bytes::Bytes;
use journal_core::{ContentHash, DraftReply, SaveDraftRequest};

use crate::{Error, JournalClient};

/// Object-safe collaborator for the draft endpoint.
///
/// [`JournalClient`] is the production implementation. The sync engine only
/// depends on this trait, so tests can substitute an in-memory recorder.
#[async_trait]
pub trait DraftTransport: Send + Sync {
    /// Submit one draft save and return the server's reply.
    async fn save_draft(&self, request: &SaveDraftRequest) -> Result<DraftReply, Error>;
}

/// Object-safe collaborator for the attachment endpoint.
#[async_trait]
pub trait AttachmentTransport: Send + Sync {
    /// Upload one chunk of the file identified by `hash`.
    ///
    /// Returns the structured reply on success.
    async fn upload_chunk(
        &self,
        hash: &ContentHash,
        chunk: Bytes,
    ) -> Result<serde_json::Value, Error>;
}

#[async_trait]
impl DraftTransport for JournalClient {
    async fn save_draft(&self, request: &SaveDraftRequest) -> Result<DraftReply, Error> {
        JournalClient::save_draft(self, request).await
    }
}

#[async_trait]
impl AttachmentTransport for JournalClient {
    async fn upload_chunk(
        &self,
        hash: &ContentHash,
        chunk: Bytes,
    ) -> Result<serde_json::Value, Error> {
        JournalClient::upload_chunk(self, hash, chunk).await
    }
}
