//! Byte-range planning for upload sessions.

use std::fmt;

/// One contiguous slice of an attachment, written by a single `PUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    /// Position of the chunk in the upload, from zero.
    pub index: usize,
    /// Offset of the first byte.
    pub start: u64,
    /// Offset of the last byte (inclusive).
    pub end: u64,
    /// Size of the whole attachment.
    pub total: u64,
}

impl ChunkRange {
    /// Number of bytes in the chunk; never zero.
    #[must_use]
    pub const fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// True for the chunk that completes the upload.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.end + 1 == self.total
    }

    /// Value of the `Content-Range` header.
    #[must_use]
    pub fn content_range(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// Splits `total` bytes into fixed-size chunks; the last takes the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Plans an upload of `total` bytes.
    ///
    /// A zero `chunk_size` is treated as one byte.
    #[must_use]
    pub fn new(total: u64, chunk_size: u64) -> Self {
        Self {
            total,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Size of the whole upload.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Number of chunks.
    #[must_use]
    pub const fn chunk_count(&self) -> u64 {
        self.total.div_ceil(self.chunk_size)
    }

    /// Iterates the chunks in upload order.
    #[must_use]
    pub const fn iter(&self) -> Chunks {
        Chunks {
            plan: *self,
            next_start: 0,
            index: 0,
        }
    }
}

impl IntoIterator for &ChunkPlan {
    type Item = ChunkRange;
    type IntoIter = Chunks;

    fn into_iter(self) -> Chunks {
        self.iter()
    }
}

/// Iterator over the chunks of a [`ChunkPlan`].
#[derive(Debug, Clone)]
pub struct Chunks {
    plan: ChunkPlan,
    next_start: u64,
    index: usize,
}

impl Iterator for Chunks {
    type Item = ChunkRange;

    fn next(&mut self) -> Option<ChunkRange> {
        if self.next_start >= self.plan.total {
            return None;
        }

        let start = self.next_start;
        let len = self.plan.chunk_size.min(self.plan.total - start);
        let range = ChunkRange {
            index: self.index,
            start,
            end: start + len - 1,
            total: self.plan.total,
        };

        self.next_start += len;
        self.index += 1;
        Some(range)
    }
}
