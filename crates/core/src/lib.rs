//! Core types shared by the journal client crates.
//!
//! This crate has no I/O. It holds the content-address primitive, the chunking
//! arithmetic, the draft wire types and the status vocabulary used by the sync
//! engine.

pub mod chunk;
pub mod draft;
pub mod hash;
pub mod reply;
pub mod status;
pub mod wordcount;

pub use chunk::{ChunkPlan, DEFAULT_CHUNK_SIZE};
pub use draft::{DraftReply, FieldSnapshot, SaveDraftRequest};
pub use hash::{ContentHash, InvalidContentHash};
pub use status::{SyncStatus, TIMESTAMP_FORMAT, format_timestamp};
pub use wordcount::{DEFAULT_WORD_TARGET, describe_word_count, is_word_target_met, word_count};
