//! In-memory hosts and transports for the engine tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use journal_client::{AttachmentTransport, DraftTransport, Error};
use journal_core::{ContentHash, DraftReply, FieldSnapshot, SaveDraftRequest, SyncStatus};
use serde_json::{Value, json};

use crate::error::SyncError;
use crate::host::{DraftFields, ProgressHandle, ProgressReporter, StatusDisplay};

#[derive(Debug, Default)]
struct FieldValues {
    body: String,
    project: Option<String>,
    unavailable: bool,
}

/// Fields shared between a test and the engine under test.
#[derive(Debug, Clone, Default)]
pub struct SharedFields(Arc<Mutex<FieldValues>>);

impl SharedFields {
    pub fn new(body: &str, project: Option<&str>) -> Self {
        Self(Arc::new(Mutex::new(FieldValues {
            body: body.to_owned(),
            project: project.map(str::to_owned),
            unavailable: false,
        })))
    }

    pub fn set_body(&self, body: &str) {
        self.0.lock().unwrap().body = body.to_owned();
    }

    pub fn set_project(&self, project: &str) {
        self.0.lock().unwrap().project = Some(project.to_owned());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.0.lock().unwrap().unavailable = unavailable;
    }
}

#[async_trait]
impl DraftFields for SharedFields {
    async fn read(&self) -> Result<FieldSnapshot, SyncError> {
        let values = self.0.lock().unwrap();
        if values.unavailable {
            return Err(SyncError::FieldUnavailable("body".into()));
        }
        Ok(FieldSnapshot::new(values.body.clone(), values.project.clone()))
    }
}

#[derive(Debug)]
enum DraftReplyScript {
    Ok(String),
    Rejected,
    ConnectionError,
}

/// Records every draft save and answers from a scripted queue.
///
/// An empty queue answers `ok` with the id `"draft"`.
#[derive(Debug, Default)]
pub struct RecordingDraftTransport {
    requests: Mutex<Vec<SaveDraftRequest>>,
    replies: Mutex<VecDeque<DraftReplyScript>>,
    delay: Option<Duration>,
}

impl RecordingDraftTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reply_ok(&self, draft_id: &str) {
        self.push(DraftReplyScript::Ok(draft_id.to_owned()));
    }

    pub fn reply_rejected(&self) {
        self.push(DraftReplyScript::Rejected);
    }

    pub fn reply_connection_error(&self) {
        self.push(DraftReplyScript::ConnectionError);
    }

    pub fn requests(&self) -> Vec<SaveDraftRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(&self, reply: DraftReplyScript) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl DraftTransport for RecordingDraftTransport {
    async fn save_draft(&self, request: &SaveDraftRequest) -> Result<DraftReply, Error> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let script = self.replies.lock().unwrap().pop_front();
        match script.unwrap_or_else(|| DraftReplyScript::Ok("draft".into())) {
            DraftReplyScript::Ok(draft_id) => Ok(DraftReply { draft_id }),
            DraftReplyScript::Rejected => Err(Error::Rejected {
                payload: json!({"ok": 0, "error": "invalid draft"}),
            }),
            DraftReplyScript::ConnectionError => Err(Error::Connection("refused".into())),
        }
    }
}

/// Records every status shown.
#[derive(Debug, Default)]
pub struct RecordingDisplay(Mutex<Vec<SyncStatus>>);

impl RecordingDisplay {
    pub fn last(&self) -> Option<SyncStatus> {
        self.0.lock().unwrap().last().cloned()
    }

    pub fn all(&self) -> Vec<SyncStatus> {
        self.0.lock().unwrap().clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn show(&self, status: &SyncStatus) {
        self.0.lock().unwrap().push(status.clone());
    }
}

/// One chunk request seen by [`RecordingAttachmentTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentChunk {
    pub hash: ContentHash,
    pub len: usize,
}

/// Records chunk uploads, fails scripted chunks and detects overlapping
/// requests for the same file.
#[derive(Debug, Default)]
pub struct RecordingAttachmentTransport {
    sent: Mutex<Vec<SentChunk>>,
    failures: Mutex<HashMap<ContentHash, usize>>,
    active: Mutex<HashSet<ContentHash>>,
    overlaps: Mutex<usize>,
    delay: Option<Duration>,
}

impl RecordingAttachmentTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `{ok: 0}` to the `nth` chunk (1-based) of `hash`.
    pub fn fail_chunk(&self, hash: &ContentHash, nth: usize) {
        self.failures.lock().unwrap().insert(hash.clone(), nth);
    }

    pub fn sent(&self) -> Vec<SentChunk> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_for(&self, hash: &ContentHash) -> Vec<usize> {
        self.sent()
            .into_iter()
            .filter(|c| &c.hash == hash)
            .map(|c| c.len)
            .collect()
    }

    pub fn overlaps(&self) -> usize {
        *self.overlaps.lock().unwrap()
    }
}

#[async_trait]
impl AttachmentTransport for RecordingAttachmentTransport {
    async fn upload_chunk(&self, hash: &ContentHash, chunk: Bytes) -> Result<Value, Error> {
        if !self.active.lock().unwrap().insert(hash.clone()) {
            *self.overlaps.lock().unwrap() += 1;
        }
        let nth = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(SentChunk {
                hash: hash.clone(),
                len: chunk.len(),
            });
            sent.iter().filter(|c| &c.hash == hash).count()
        };
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.lock().unwrap().remove(hash);

        if self.failures.lock().unwrap().get(hash) == Some(&nth) {
            return Err(Error::Rejected {
                payload: json!({"ok": 0}),
            });
        }
        Ok(json!({"ok": 1}))
    }
}

/// Visible state of one recorded progress entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressEntry {
    pub name: String,
    pub hash: Option<ContentHash>,
    pub done: usize,
    pub total: usize,
    pub completed: bool,
    pub failed: bool,
}

/// Records every progress entry and its updates.
#[derive(Debug, Default)]
pub struct RecordingProgress(Arc<Mutex<Vec<ProgressEntry>>>);

impl RecordingProgress {
    pub fn entries(&self) -> Vec<ProgressEntry> {
        self.0.lock().unwrap().clone()
    }

    pub fn entry(&self, hash: &ContentHash) -> Option<ProgressEntry> {
        self.entries()
            .into_iter()
            .find(|e| e.hash.as_ref() == Some(hash))
    }
}

impl ProgressReporter for RecordingProgress {
    fn add(&self, name: &str, hash: &ContentHash, total_chunks: usize) -> Box<dyn ProgressHandle> {
        let mut entries = self.0.lock().unwrap();
        entries.push(ProgressEntry {
            name: name.to_owned(),
            hash: Some(hash.clone()),
            total: total_chunks,
            ..ProgressEntry::default()
        });
        Box::new(RecordedHandle {
            entries: Arc::clone(&self.0),
            index: entries.len() - 1,
        })
    }
}

struct RecordedHandle {
    entries: Arc<Mutex<Vec<ProgressEntry>>>,
    index: usize,
}

impl RecordedHandle {
    fn with(&self, f: impl FnOnce(&mut ProgressEntry)) {
        f(&mut self.entries.lock().unwrap()[self.index]);
    }
}

impl ProgressHandle for RecordedHandle {
    fn update(&self, done: usize, total: usize) {
        self.with(|e| {
            e.done = done;
            e.total = total;
        });
    }

    fn complete(&self) {
        self.with(|e| e.completed = true);
    }

    fn fail(&self) {
        self.with(|e| e.failed = true);
    }
}
