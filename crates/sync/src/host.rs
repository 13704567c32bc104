//! The editing surface the engines read from and report to.
//!
//! A host page provides live field values, a status display and a list of
//! per-file progress entries. Each of these is optional on a given page; the
//! engines degrade to silent background work when a display is missing.

use async_trait::async_trait;
use journal_core::{ContentHash, FieldSnapshot, SyncStatus};

use crate::error::SyncError;

/// Live values of the fields tracked by the draft sync engine.
#[async_trait]
pub trait DraftFields: Send + Sync {
    /// Read the current body and, when the form has a project field, the
    /// current project.
    ///
    /// Whether `project` is `Some` must not change over the life of a form.
    async fn read(&self) -> Result<FieldSnapshot, SyncError>;
}

/// Receives every status change of the draft sync engine.
pub trait StatusDisplay: Send + Sync {
    /// Replace the displayed status with `status`.
    fn show(&self, status: &SyncStatus);
}

/// Creates the visible entry for each admitted attachment.
pub trait ProgressReporter: Send + Sync {
    /// Append an entry for a newly admitted file and return its handle.
    fn add(&self, name: &str, hash: &ContentHash, total_chunks: usize) -> Box<dyn ProgressHandle>;
}

/// The visible entry of one attachment.
pub trait ProgressHandle: Send + Sync {
    /// `done` of `total` chunks have been confirmed by the server.
    fn update(&self, done: usize, total: usize);

    /// Every chunk was accepted.
    fn complete(&self);

    /// The upload stopped on a failed chunk.
    fn fail(&self);
}

/// A [`ProgressReporter`] for hosts without an attachment list.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn add(&self, _name: &str, _hash: &ContentHash, _total: usize) -> Box<dyn ProgressHandle> {
        Box::new(NoProgress)
    }
}

impl ProgressHandle for NoProgress {
    fn update(&self, _done: usize, _total: usize) {}

    fn complete(&self) {}

    fn fail(&self) {}
}
