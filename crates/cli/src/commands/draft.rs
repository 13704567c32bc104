use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use clap::Args;
use journal_client::JournalClient;
use journal_core::{
    DEFAULT_WORD_TARGET, FieldSnapshot, SyncStatus, describe_word_count, is_word_target_met,
    word_count,
};
use journal_sync::{DraftFields, DraftSyncEngine, StatusDisplay, SyncConfig, SyncError};
use tracing::info;

#[derive(Args, Debug)]
pub struct DraftArgs {
    /// File holding the draft body. Re-read on every tick.
    pub body_file: PathBuf,
    /// File holding the project tag.
    #[arg(long)]
    pub project_file: Option<PathBuf>,
    /// Word goal; reaching it is marked on the status line.
    #[arg(long, default_value_t = DEFAULT_WORD_TARGET)]
    pub word_target: usize,
}

/// Draft fields backed by files on disk.
struct FileFields {
    body: PathBuf,
    project: Option<PathBuf>,
    words: AtomicUsize,
}

impl FileFields {
    fn new(body: PathBuf, project: Option<PathBuf>) -> Self {
        Self {
            body,
            project,
            words: AtomicUsize::new(0),
        }
    }
}

/// Read one field file. A file that is briefly missing, as during an editor's
/// rename-on-save, is unavailable rather than broken.
async fn read_field(path: &Path) -> Result<String, SyncError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => {
                SyncError::FieldUnavailable(path.display().to_string())
            }
            _ => SyncError::Read {
                path: path.to_path_buf(),
                source,
            },
        })
}

#[async_trait]
impl DraftFields for FileFields {
    async fn read(&self) -> Result<FieldSnapshot, SyncError> {
        let body = read_field(&self.body).await?;
        let project = match &self.project {
            Some(path) => Some(read_field(path).await?.trim().to_owned()),
            None => None,
        };
        self.words.store(word_count(&body), Ordering::Relaxed);
        Ok(FieldSnapshot::new(body, project))
    }
}

/// Prints each status with the word count of the last body read.
struct TerminalStatus {
    fields: Arc<FileFields>,
    word_target: usize,
}

impl StatusDisplay for TerminalStatus {
    fn show(&self, status: &SyncStatus) {
        let words = self.fields.words.load(Ordering::Relaxed);
        println!("{}", status_line(status, words, self.word_target));
    }
}

fn status_line(status: &SyncStatus, words: usize, word_target: usize) -> String {
    let described = describe_word_count(words);
    if described.is_empty() {
        status.to_string()
    } else if is_word_target_met(words, word_target) {
        format!("{status} ({described}, target reached)")
    } else {
        format!("{status} ({described})")
    }
}

pub async fn run(
    client: Arc<JournalClient>,
    config: &SyncConfig,
    args: &DraftArgs,
) -> anyhow::Result<()> {
    let fields = if tokio::fs::try_exists(&args.body_file).await? {
        Some(Arc::new(FileFields::new(
            args.body_file.clone(),
            args.project_file.clone(),
        )))
    } else {
        info!(path = %args.body_file.display(), "body file not found; nothing to sync");
        None
    };
    let status = fields.as_ref().map(|fields| {
        Arc::new(TerminalStatus {
            fields: Arc::clone(fields),
            word_target: args.word_target,
        }) as Arc<dyn StatusDisplay>
    });
    let fields = fields.map(|fields| fields as Arc<dyn DraftFields>);

    let Some(handle) = DraftSyncEngine::start(config.draft.clone(), client, fields, status).await?
    else {
        return Ok(());
    };

    tokio::signal::ctrl_c().await?;
    info!(draft_id = %handle.engine().draft_id(), "stopping draft autosave");
    handle.shutdown().await;
    Ok(())
}
