//! Fixed-size chunking arithmetic.

use std::ops::Range;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 125_000;

/// How a buffer of a given length is cut into chunks.
///
/// Every chunk is exactly `chunk_size` bytes except the last one, which holds
/// the remainder. A zero-length buffer has no chunks at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    len: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    /// Create a plan for a buffer of `len` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    #[must_use]
    pub fn new(len: usize, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be non-zero");
        Self { len, chunk_size }
    }

    /// Total length of the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Configured chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks, `ceil(len / chunk_size)`.
    pub fn total_chunks(&self) -> usize {
        self.len.div_ceil(self.chunk_size)
    }

    /// Byte range of the chunk that starts at `offset`, or `None` once the
    /// offset has reached the end of the buffer.
    pub fn window(&self, offset: usize) -> Option<Range<usize>> {
        if offset >= self.len {
            return None;
        }
        let end = offset.saturating_add(self.chunk_size).min(self.len);
        Some(offset..end)
    }

    /// Number of whole or partial chunks fully covered by `offset` bytes.
    pub fn chunks_done(&self, offset: usize) -> usize {
        offset.min(self.len).div_ceil(self.chunk_size)
    }

    /// Iterate over every chunk range in order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let mut offset = 0;
        std::iter::from_fn(move || {
            let range = self.window(offset)?;
            offset = range.end;
            Some(range)
        })
    }
}
