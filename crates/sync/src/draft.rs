//! Draft autosave engine.
//!
//! The engine polls the tracked fields on a fixed interval. When they differ
//! from the values of the last successful save it posts them to the draft
//! endpoint and adopts the draft id from the reply. A failed save leaves the
//! last-saved snapshot untouched, so the same change is retried on the next
//! tick.
//!
//! Overlapping saves are possible: when a save takes longer than the tick
//! interval, the next tick still sees a difference and starts another save
//! with the same draft id. This is the default behaviour; set
//! [`DraftConfig::serialize_saves`] to skip ticks while a save is in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Local;
use journal_client::DraftTransport;
use journal_core::{FieldSnapshot, SaveDraftRequest, SyncStatus};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

use crate::config::DraftConfig;
use crate::error::SyncError;
use crate::host::{DraftFields, StatusDisplay};

/// What one tick of the engine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Fields match the last successful save; no request was sent.
    Unchanged,
    /// A save was still in flight and `serialize_saves` is on.
    Skipped,
    /// The fields could not be read; nothing was sent.
    Unavailable,
    /// The draft was saved under `draft_id`.
    Saved {
        /// Id returned by the server.
        draft_id: String,
    },
    /// The body was empty and the server deleted the draft.
    Deleted {
        /// Id returned by the server.
        draft_id: String,
    },
    /// The save failed and will be retried on the next tick.
    Failed,
}

#[derive(Debug)]
struct DraftState {
    draft_id: String,
    last_saved: FieldSnapshot,
}

struct Inner {
    config: DraftConfig,
    transport: Arc<dyn DraftTransport>,
    fields: Arc<dyn DraftFields>,
    status: Option<Arc<dyn StatusDisplay>>,
    state: Mutex<DraftState>,
    in_flight: AtomicUsize,
}

/// Keeps one remote draft in sync with the local fields.
///
/// Cloning is cheap; clones share the draft id and the last-saved snapshot.
#[derive(Clone)]
pub struct DraftSyncEngine {
    inner: Arc<Inner>,
}

impl DraftSyncEngine {
    /// Create an engine for a form whose fields are `fields`.
    ///
    /// The current field values count as saved: nothing is sent until they
    /// change. Fails with [`SyncError::Config`] when `config` is invalid.
    pub async fn new(
        config: DraftConfig,
        transport: Arc<dyn DraftTransport>,
        fields: Arc<dyn DraftFields>,
        status: Option<Arc<dyn StatusDisplay>>,
    ) -> Result<Self, SyncError> {
        config.validate()?;
        let initial = fields.read().await?;
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                transport,
                fields,
                status,
                state: Mutex::new(DraftState {
                    draft_id: String::new(),
                    last_saved: initial,
                }),
                in_flight: AtomicUsize::new(0),
            }),
        })
    }

    /// Start autosaving on the page described by `fields`.
    ///
    /// Returns `None` without installing a timer when the page has no draft
    /// form.
    pub async fn start(
        config: DraftConfig,
        transport: Arc<dyn DraftTransport>,
        fields: Option<Arc<dyn DraftFields>>,
        status: Option<Arc<dyn StatusDisplay>>,
    ) -> Result<Option<DraftSyncHandle>, SyncError> {
        config.validate()?;
        let Some(fields) = fields else {
            debug!("no draft form on this page; autosave disabled");
            return Ok(None);
        };
        let engine = Self::new(config, transport, fields, status).await?;
        Ok(Some(engine.spawn()))
    }

    /// The current draft id; empty until the first successful save.
    pub fn draft_id(&self) -> String {
        self.state().draft_id.clone()
    }

    /// Field values of the last successful save.
    pub fn last_saved(&self) -> FieldSnapshot {
        self.state().last_saved.clone()
    }

    /// Number of saves currently waiting for a reply.
    pub fn saves_in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Read the fields and build a save request if they changed since the
    /// last successful save.
    pub async fn pending_change(&self) -> Result<Option<SaveDraftRequest>, SyncError> {
        let live = self.inner.fields.read().await?;
        let state = self.state();
        if live == state.last_saved {
            return Ok(None);
        }
        Ok(Some(SaveDraftRequest::new(state.draft_id.clone(), &live)))
    }

    /// Run one change-detection cycle and wait for its save, if any.
    pub async fn tick(&self) -> TickOutcome {
        match self.prepare_tick().await {
            Ok(request) => self.save(request).await,
            Err(outcome) => outcome,
        }
    }

    /// Submit `request` and apply the reply.
    ///
    /// On success the draft id and the last-saved snapshot are replaced. On
    /// failure nothing changes besides the status.
    pub async fn save(&self, request: SaveDraftRequest) -> TickOutcome {
        let _in_flight = InFlight::enter(&self.inner.in_flight);
        self.show(&SyncStatus::Saving);

        match self.inner.transport.save_draft(&request).await {
            Ok(reply) => {
                {
                    let mut state = self.state();
                    state.draft_id.clone_from(&reply.draft_id);
                    state.last_saved = request.snapshot();
                }
                let at = Local::now();
                if request.is_deletion() {
                    info!(draft_id = %reply.draft_id, "draft deleted");
                    self.show(&SyncStatus::Deleted { at });
                    TickOutcome::Deleted {
                        draft_id: reply.draft_id,
                    }
                } else {
                    info!(draft_id = %reply.draft_id, "draft saved");
                    self.show(&SyncStatus::Saved { at });
                    TickOutcome::Saved {
                        draft_id: reply.draft_id,
                    }
                }
            }
            Err(e) => {
                match e.payload() {
                    Some(payload) => error!(%payload, "unable to save draft"),
                    None => error!(error = %e, retryable = e.is_retryable(), "automatic save failed"),
                }
                self.show(&SyncStatus::Error);
                TickOutcome::Failed
            }
        }
    }

    /// Install the interval timer and return the handle that owns it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> DraftSyncHandle {
        let token = CancellationToken::new();
        let tracker = TaskTracker::new();

        let engine = self.clone();
        let loop_token = token.clone();
        let loop_tracker = tracker.clone();
        tracker.spawn(async move { engine.run(loop_token, loop_tracker).await });

        DraftSyncHandle {
            engine: self,
            token,
            tracker,
        }
    }

    async fn run(self, token: CancellationToken, tracker: TaskTracker) {
        let period = self.inner.config.interval();
        info!(interval_ms = self.inner.config.interval_ms, "draft autosave started");

        // The first check happens one full interval after start.
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => {
                    info!("draft autosave stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let Ok(request) = self.prepare_tick().await else {
                        continue;
                    };
                    let engine = self.clone();
                    let save_token = token.clone();
                    tracker.spawn(async move {
                        tokio::select! {
                            () = save_token.cancelled() => {
                                debug!("abandoning in-flight draft save");
                            }
                            _ = engine.save(request) => {}
                        }
                    });
                }
            }
        }
    }

    /// Decide whether this tick saves. `Err` carries the outcome of a tick
    /// that sends nothing.
    async fn prepare_tick(&self) -> Result<SaveDraftRequest, TickOutcome> {
        if self.inner.config.serialize_saves && self.saves_in_flight() > 0 {
            debug!("previous draft save still in flight; skipping tick");
            return Err(TickOutcome::Skipped);
        }
        match self.pending_change().await {
            Ok(Some(request)) => Ok(request),
            Ok(None) => Err(TickOutcome::Unchanged),
            Err(e) => {
                warn!(error = %e, "cannot read draft fields");
                Err(TickOutcome::Unavailable)
            }
        }
    }

    fn show(&self, status: &SyncStatus) {
        if let Some(display) = &self.inner.status {
            display.show(status);
        }
    }

    fn state(&self) -> MutexGuard<'_, DraftState> {
        // The state holds plain values; a poisoned lock still has a usable snapshot.
        self.inner
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DraftSyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSyncEngine")
            .field("config", &self.inner.config)
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}

/// Counts a save as in flight until dropped, including when the save future
/// is abandoned.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the autosave timer of a running [`DraftSyncEngine`].
#[derive(Debug)]
pub struct DraftSyncHandle {
    engine: DraftSyncEngine,
    token: CancellationToken,
    tracker: TaskTracker,
}

impl DraftSyncHandle {
    /// The engine driven by this handle.
    pub fn engine(&self) -> &DraftSyncEngine {
        &self.engine
    }

    /// Stop the timer, abandon in-flight saves and wait for the tasks to end.
    pub async fn shutdown(self) {
        self.token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
