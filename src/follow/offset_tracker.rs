// SPDX-License-Identifier: Apache-2.0

//! Offset tracking across poll cycles.
//!
//! The tracker remembers how many bytes of the followed file have already
//! been handed to the parser. At the start of every cycle it is asked where
//! to seek given the size observed for that cycle, and once the parser has
//! consumed up to that size the observed size becomes the new offset.
//!
//! ## Offset Semantics
//!
//! - An unset offset means nothing has been read yet; the cycle starts at 0.
//! - An offset larger than the observed size means the file shrank (truncated
//!   or rotated and recreated); the cycle starts at 0 again.
//! - Otherwise the cycle resumes at the stored offset, so only appended bytes
//!   are read.
//!
//! The committed offset is always the size measured at cycle start, never a
//! size re-measured after parsing. Bytes appended while a parse is running
//! belong to the next cycle.

/// Represents a record's position in a file.
///
/// The offset is the byte position where the record BEGINS, and len is the
/// total bytes consumed (including the newline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct LineOffset {
    /// Byte position where the record begins
    pub offset: u64,
    /// Length of the record in bytes (including newline)
    pub len: u32,
}

impl LineOffset {
    /// Create a new LineOffset
    pub fn new(offset: u64, len: u32) -> Self {
        Self { offset, len }
    }

    /// Get the ending byte position (offset + len)
    pub fn end_offset(&self) -> u64 {
        self.offset + self.len as u64
    }
}

/// Where a cycle should start reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekDecision {
    /// Byte position to seek to before handing the stream to the parser
    pub position: u64,
    /// The file shrank below the previous offset
    pub truncated: bool,
}

/// Compute the seek position for a cycle from the previous offset and the
/// size observed at the start of that cycle.
pub fn seek_position(previous: Option<u64>, observed_size: u64) -> SeekDecision {
    match previous {
        None => SeekDecision {
            position: 0,
            truncated: false,
        },
        Some(offset) if offset > observed_size => SeekDecision {
            position: 0,
            truncated: true,
        },
        Some(offset) => SeekDecision {
            position: offset,
            truncated: false,
        },
    }
}

/// Tracks the delivered offset of a single followed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OffsetTracker {
    offset: Option<u64>,
}

impl OffsetTracker {
    /// Create a tracker with no offset recorded ("read from start").
    pub fn new() -> Self {
        Self { offset: None }
    }

    /// The committed offset, or None if no cycle has completed yet.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Decide where the next cycle starts given the size observed for it.
    pub fn seek_for(&self, observed_size: u64) -> SeekDecision {
        seek_position(self.offset, observed_size)
    }

    /// Record that the parser consumed everything up to `observed_size`.
    pub fn commit(&mut self, observed_size: u64) {
        self.offset = Some(observed_size);
    }

    /// Forget the offset, as if the file had never been read.
    pub fn reset(&mut self) {
        self.offset = None;
    }
}
