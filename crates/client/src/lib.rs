//! Journal HTTP Client
//!
//! A native Rust client for the journal server's draft and attachment endpoints.
//!
//! # Quick Start
//!
//! ```no_run
//! use journal_client::JournalClient;
//! use journal_core::{FieldSnapshot, SaveDraftRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), journal_client::Error> {
//!     // The page URL carries the access parameters of the session.
//!     let client = JournalClient::new("http://localhost:8848/journal?apikey=secret")?;
//!
//!     let snapshot = FieldSnapshot::new("Dear diary", None);
//!     let reply = client.save_draft(&SaveDraftRequest::new("", &snapshot)).await?;
//!     println!("Draft id: {}", reply.draft_id);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - Draft saves (form-encoded, structured `ok` reply)
//! - Raw chunk uploads keyed by content address
//! - Endpoint URLs resolved relative to the page URL, carrying its query parameters
//! - Object-safe transport traits for the sync engine and upload pipeline
//!
//! # Configuration
//!
//! No request timeout is set unless one is configured:
//!
//! ```no_run
//! use journal_client::JournalClientBuilder;
//! use std::time::Duration;
//!
//! let client = JournalClientBuilder::new("http://localhost:8848/journal")
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//! ```

pub mod endpoint;
mod error;
mod transport;

pub use error::Error;
pub use transport::{AttachmentTransport, DraftTransport};

use std::time::Duration;

use bytes::Bytes;
use journal_core::{ContentHash, DraftReply, SaveDraftRequest, reply};
use reqwest::{Client, Response, StatusCode, Url};
use tracing::{debug, warn};

/// HTTP client for the journal server.
///
/// Every endpoint is resolved relative to the page URL the client was built
/// with, so a single client serves one editing page.
#[derive(Debug, Clone)]
pub struct JournalClient {
    client: Client,
    page_url: Url,
}

/// Builder for configuring a [`JournalClient`].
#[derive(Debug)]
pub struct JournalClientBuilder {
    page_url: String,
    timeout: Option<Duration>,
    client: Option<Client>,
}

impl JournalClientBuilder {
    /// Create a new builder for the given page URL.
    pub fn new(page_url: impl Into<String>) -> Self {
        Self {
            page_url: page_url.into(),
            timeout: None,
            client: None,
        }
    }

    /// Set a request timeout. Unset by default: a hung request waits forever.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a custom reqwest Client.
    ///
    /// Useful for configuring TLS, proxies, or other advanced settings.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<JournalClient, Error> {
        let page_url = Url::parse(&self.page_url)
            .map_err(|e| Error::Configuration(format!("invalid page URL: {e}")))?;
        if page_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "page URL {page_url} cannot be used as a base"
            )));
        }

        let client = match self.client {
            Some(c) => c,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder
                    .build()
                    .map_err(|e| Error::Configuration(e.to_string()))?
            }
        };

        Ok(JournalClient { client, page_url })
    }
}

impl JournalClient {
    /// Create a new client with default configuration.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use journal_client::JournalClient;
    ///
    /// let client = JournalClient::new("http://localhost:8848/journal").unwrap();
    /// ```
    pub fn new(page_url: impl Into<String>) -> Result<Self, Error> {
        JournalClientBuilder::new(page_url).build()
    }

    /// Create a builder for advanced configuration.
    pub fn builder(page_url: impl Into<String>) -> JournalClientBuilder {
        JournalClientBuilder::new(page_url)
    }

    /// Get the page URL.
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    /// URL of the draft endpoint.
    pub fn draft_url(&self) -> Result<Url, Error> {
        endpoint::resolve(&self.page_url, endpoint::DRAFT_PATH, &[])
    }

    /// URL of the attachment endpoint for the file identified by `hash`.
    pub fn attachment_url(&self, hash: &ContentHash) -> Result<Url, Error> {
        endpoint::resolve(
            &self.page_url,
            endpoint::ATTACHMENT_PATH,
            &[(endpoint::HASH_PARAM, hash.as_str())],
        )
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    /// Save the draft described by `request`.
    ///
    /// An empty `draft_id` asks the server to create a draft. The reply carries
    /// the id to use for every later save.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> Result<(), journal_client::Error> {
    /// use journal_client::JournalClient;
    /// use journal_core::{FieldSnapshot, SaveDraftRequest};
    ///
    /// let client = JournalClient::new("http://localhost:8848/journal")?;
    /// let first = client
    ///     .save_draft(&SaveDraftRequest::new("", &FieldSnapshot::new("hello", None)))
    ///     .await?;
    /// let again = SaveDraftRequest::new(first.draft_id, &FieldSnapshot::new("hello world", None));
    /// client.save_draft(&again).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn save_draft(&self, request: &SaveDraftRequest) -> Result<DraftReply, Error> {
        let url = self.draft_url()?;
        debug!(%url, draft_id = %request.draft_id, "saving draft");

        let response = self
            .client
            .post(url)
            .form(request)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let payload = read_reply(response, reply::is_draft_saved).await?;
        serde_json::from_value(payload).map_err(|e| Error::Deserialization(e.to_string()))
    }

    // =========================================================================
    // Attachments
    // =========================================================================

    /// Upload one chunk of the file identified by `hash`.
    ///
    /// The body is the raw chunk. The server groups chunks by hash and
    /// appends them in the order they arrive.
    pub async fn upload_chunk(
        &self,
        hash: &ContentHash,
        chunk: Bytes,
    ) -> Result<serde_json::Value, Error> {
        let url = self.attachment_url(hash)?;
        debug!(hash = %hash.short(), bytes = chunk.len(), "uploading chunk");

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(chunk)
            .send()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        read_reply(response, reply::is_ok).await
    }
}

/// Read a structured reply and classify it.
///
/// A JSON object with an `ok` member is a structured reply whatever the HTTP
/// status; one that `accepted` refuses becomes [`Error::Rejected`]. Error
/// statuses without a structured body become [`Error::Http`].
async fn read_reply(
    response: Response,
    accepted: fn(&serde_json::Value) -> bool,
) -> Result<serde_json::Value, Error> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    if !status.is_success() {
        return match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(payload) if payload.get("ok").is_some() => Err(rejected(status, payload)),
            _ => Err(Error::Http {
                status: status.as_u16(),
                message: if text.is_empty() {
                    status.to_string()
                } else {
                    text
                },
            }),
        };
    }

    let payload: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| Error::Deserialization(e.to_string()))?;
    if accepted(&payload) {
        Ok(payload)
    } else {
        Err(rejected(status, payload))
    }
}

fn rejected(status: StatusCode, payload: serde_json::Value) -> Error {
    warn!(
        status = status.as_u16(),
        message = reply::message(&payload).unwrap_or_default(),
        "server rejected request"
    );
    Error::Rejected { payload }
}
