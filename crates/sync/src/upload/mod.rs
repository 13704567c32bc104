//! Chunked, content-addressed attachment uploads.
//!
//! Every selected file is hashed before any network activity. The hash is the
//! dedup key within a session and the `att_hash` parameter that lets the server
//! group the chunks of one file. A file is sent as a sequence of fixed-size
//! chunks; the offset only advances when the server accepts a chunk, and the
//! first failure abandons the file.

mod pipeline;
mod registry;

pub use pipeline::{Admission, SelectedFile, UploadPipeline};
pub use registry::{Attachment, AttachmentRegistry, AttachmentSummary, TransferState, form_field};
