use std::path::Path;

use anyhow::Context;
use journal_client::JournalClient;
use journal_sync::SyncConfig;

/// Load the configuration file, if any, and apply the command-line page URL.
pub fn load(path: Option<&Path>, page_url: Option<String>) -> anyhow::Result<SyncConfig> {
    let mut config: SyncConfig = if let Some(path) = path {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&contents)?
    } else {
        toml::from_str("")?
    };

    if page_url.is_some() {
        config.page_url = page_url;
    }
    config.validate()?;
    Ok(config)
}

/// Build the HTTP client for the configured page.
pub fn client(config: &SyncConfig) -> anyhow::Result<JournalClient> {
    let page_url = config
        .page_url
        .as_deref()
        .context("no page URL: pass --page-url or set page_url in the config file")?;

    let mut builder = JournalClient::builder(page_url);
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
