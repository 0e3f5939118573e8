// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use crate::follow::entry::Entry;
use crate::follow::error::Result;

/// Parser transforms an Entry whose body is a raw log line by extracting
/// structured fields into the entry's attributes.
///
/// The body remains the original log line; parsed fields go to attributes,
/// and well-known fields may set the severity and timestamp.
pub trait Parser: Send + Sync {
    fn parse(&self, entry: Entry) -> Result<Entry>;
}

/// Byte-stream-to-entry collaborator driven by the tail loop.
///
/// Implementations own any partial-record buffering: a record cut in half by
/// the end of the available data must be completed by a later `consume`.
pub trait EntryParser: Send {
    type Entry: Send + 'static;

    /// Read `stream` to its end, calling `on_entry` once per complete record
    /// in stream order. `start_offset` is the file position of the stream's
    /// first byte.
    fn consume(
        &mut self,
        stream: &mut dyn Read,
        start_offset: u64,
        on_entry: &mut dyn FnMut(Self::Entry),
    ) -> Result<()>;

    /// Discard partial-record state. Called when the file was truncated or
    /// the followed path changed.
    fn reset(&mut self) {}
}
