use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use journal_core::{ChunkPlan, ContentHash};

use crate::host::{ProgressHandle, ProgressReporter};

/// Transfer state of one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Registered, waiting for its stagger delay.
    Pending,
    /// A chunk request is in flight.
    Sending,
    /// Every chunk was accepted.
    Succeeded,
    /// A chunk failed; the upload is abandoned.
    Failed,
}

impl TransferState {
    /// Whether no further chunk will be sent.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// One file queued for upload.
pub struct Attachment {
    seq: usize,
    name: String,
    hash: ContentHash,
    buffer: Bytes,
    offset: usize,
    plan: ChunkPlan,
    state: TransferState,
    progress: Box<dyn ProgressHandle>,
}

impl Attachment {
    /// Display name of the file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Content address of the file.
    pub fn hash(&self) -> &ContentHash {
        &self.hash
    }

    /// Next unsent byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current transfer state.
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Form field that references this attachment when the entry is submitted.
    pub fn form_field(&self) -> String {
        form_field(&self.hash)
    }

    /// Slice the next chunk and mark the attachment as sending.
    ///
    /// Returns `None` once the offset has reached the end of the buffer.
    fn begin_chunk(&mut self) -> Option<Bytes> {
        let window = self.plan.window(self.offset)?;
        self.state = TransferState::Sending;
        Some(self.buffer.slice(window))
    }

    fn advance(&mut self, sent: usize) {
        self.offset += sent;
        self.progress.update(
            self.plan.chunks_done(self.offset),
            self.plan.total_chunks(),
        );
    }

    fn succeed(&mut self) {
        self.state = TransferState::Succeeded;
        self.progress.complete();
    }

    fn fail(&mut self) {
        self.state = TransferState::Failed;
        self.progress.fail();
    }

    fn summary(&self) -> AttachmentSummary {
        AttachmentSummary {
            name: self.name.clone(),
            hash: self.hash.clone(),
            len: self.plan.len(),
            offset: self.offset,
            chunks_done: self.plan.chunks_done(self.offset),
            total_chunks: self.plan.total_chunks(),
            state: self.state,
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("hash", &self.hash)
            .field("len", &self.plan.len())
            .field("offset", &self.offset)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Form field name referencing the attachment with `hash`.
pub fn form_field(hash: &ContentHash) -> String {
    format!("attachment-{hash}")
}

/// Point-in-time view of an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSummary {
    /// Display name.
    pub name: String,
    /// Content address.
    pub hash: ContentHash,
    /// File size in bytes.
    pub len: usize,
    /// Bytes confirmed by the server.
    pub offset: usize,
    /// Chunks confirmed by the server.
    pub chunks_done: usize,
    /// Total number of chunks.
    pub total_chunks: usize,
    /// Transfer state.
    pub state: TransferState,
}

impl AttachmentSummary {
    /// Form field that references this attachment when the entry is submitted.
    pub fn form_field(&self) -> String {
        form_field(&self.hash)
    }
}

/// Outcome of asking the registry for the next chunk of a file.
#[derive(Debug)]
pub(crate) enum NextChunk {
    /// Send this chunk.
    Send(Bytes),
    /// The buffer is exhausted; the attachment is now `Succeeded`.
    Finished,
    /// The attachment is unknown or already terminal.
    Stopped,
}

/// Attachments of one session, keyed by content address.
///
/// Admission uses the map's entry API, so two selections of the same content
/// can never both register.
#[derive(Default)]
pub struct AttachmentRegistry {
    entries: DashMap<ContentHash, Attachment>,
    next_seq: AtomicUsize,
}

impl AttachmentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered attachments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether content with `hash` is already registered.
    pub fn contains(&self, hash: &ContentHash) -> bool {
        self.entries.contains_key(hash)
    }

    /// View of the attachment with `hash`.
    pub fn get(&self, hash: &ContentHash) -> Option<AttachmentSummary> {
        self.entries.get(hash).map(|a| a.summary())
    }

    /// Views of every attachment in admission order.
    pub fn summaries(&self) -> Vec<AttachmentSummary> {
        let mut all: Vec<(usize, AttachmentSummary)> = self
            .entries
            .iter()
            .map(|a| (a.seq, a.summary()))
            .collect();
        all.sort_by_key(|(seq, _)| *seq);
        all.into_iter().map(|(_, s)| s).collect()
    }

    /// Register `buffer` under `hash` unless that content is already known.
    ///
    /// The progress entry is only created for a new registration. Returns
    /// `false` for a duplicate.
    pub(crate) fn register(
        &self,
        name: &str,
        hash: ContentHash,
        buffer: Bytes,
        chunk_size: usize,
        reporter: &dyn ProgressReporter,
    ) -> bool {
        match self.entries.entry(hash) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                let plan = ChunkPlan::new(buffer.len(), chunk_size);
                let progress = reporter.add(name, vacant.key(), plan.total_chunks());
                let attachment = Attachment {
                    seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
                    name: name.to_owned(),
                    hash: vacant.key().clone(),
                    buffer,
                    offset: 0,
                    plan,
                    state: TransferState::Pending,
                    progress,
                };
                vacant.insert(attachment);
                true
            }
        }
    }

    /// Slice the next chunk of `hash`, or mark it succeeded when exhausted.
    pub(crate) fn next_chunk(&self, hash: &ContentHash) -> NextChunk {
        let Some(mut attachment) = self.entries.get_mut(hash) else {
            return NextChunk::Stopped;
        };
        if attachment.state.is_terminal() {
            return NextChunk::Stopped;
        }
        match attachment.begin_chunk() {
            Some(chunk) => NextChunk::Send(chunk),
            None => {
                attachment.succeed();
                NextChunk::Finished
            }
        }
    }

    /// Record that `sent` bytes of `hash` were accepted.
    pub(crate) fn chunk_accepted(&self, hash: &ContentHash, sent: usize) {
        if let Some(mut attachment) = self.entries.get_mut(hash) {
            attachment.advance(sent);
        }
    }

    /// Mark `hash` as failed. The offset stays where it is.
    pub(crate) fn chunk_failed(&self, hash: &ContentHash) {
        if let Some(mut attachment) = self.entries.get_mut(hash) {
            attachment.fail();
        }
    }
}

impl std::fmt::Debug for AttachmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachmentRegistry")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
