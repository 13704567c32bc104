use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use journal_client::JournalClient;
use journal_core::ContentHash;
use journal_sync::{
    Admission, ProgressHandle, ProgressReporter, SyncConfig, TransferState, UploadPipeline,
};

#[derive(Args, Debug)]
pub struct AttachArgs {
    /// Files to upload.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Prints one line per progress change.
struct TerminalProgress;

impl ProgressReporter for TerminalProgress {
    fn add(&self, name: &str, hash: &ContentHash, total_chunks: usize) -> Box<dyn ProgressHandle> {
        println!("{name} [{}] queued, {total_chunks} chunks", hash.short());
        Box::new(TerminalEntry {
            name: name.to_owned(),
        })
    }
}

struct TerminalEntry {
    name: String,
}

impl ProgressHandle for TerminalEntry {
    fn update(&self, done: usize, total: usize) {
        println!("{} [{done}/{total}]", self.name);
    }

    fn complete(&self) {
        println!("{} √", self.name);
    }

    fn fail(&self) {
        println!("{} ×", self.name);
    }
}

pub async fn run(
    client: Arc<JournalClient>,
    config: &SyncConfig,
    args: &AttachArgs,
) -> anyhow::Result<()> {
    let pipeline = UploadPipeline::new(config.upload.clone(), client, Arc::new(TerminalProgress))?;

    let admissions = pipeline.admit_paths(&args.files).await?;
    for (path, admission) in args.files.iter().zip(&admissions) {
        if let Admission::Duplicate { hash } = admission {
            println!("{} skipped: same content as [{}]", path.display(), hash.short());
        }
    }
    pipeline.wait_idle().await;

    let attachments = pipeline.attachments();
    let failed = attachments
        .iter()
        .filter(|a| a.state == TransferState::Failed)
        .count();
    for attachment in attachments
        .iter()
        .filter(|a| a.state == TransferState::Succeeded)
    {
        println!("{}\t{}", attachment.form_field(), attachment.name);
    }
    pipeline.shutdown().await;

    if failed > 0 {
        anyhow::bail!("{failed} of {} attachments failed to upload", attachments.len());
    }
    Ok(())
}
