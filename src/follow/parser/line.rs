// SPDX-License-Identifier: Apache-2.0

use std::io::{ErrorKind, Read};

use tracing::debug;

use super::traits::{EntryParser, Parser};
use super::{JsonParser, RegexParser};
use crate::follow::config::{FollowConfig, ParserType};
use crate::follow::entry::{Entry, Severity};
use crate::follow::error::{Error, Result};
use crate::follow::offset_tracker::LineOffset;

const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Frames a byte stream into newline-terminated records.
///
/// Bytes after the last newline are held back until a later `consume`
/// completes the record, so a line written in two pieces is delivered once,
/// whole. Records are decoded as lossy UTF-8, a trailing `\r` is stripped and
/// empty lines are skipped. Records longer than `max_log_size` are cut, but
/// their full length still counts towards `LineOffset`.
pub struct LineEntryParser {
    parser: Option<Box<dyn Parser>>,
    max_log_size: usize,
    /// Retained bytes of the current incomplete record
    partial: Vec<u8>,
    /// Total length of the current incomplete record, including cut bytes
    partial_len: u64,
    /// File position where the current incomplete record begins
    partial_start: u64,
}

impl LineEntryParser {
    /// Create a parser emitting raw lines
    pub fn new(max_log_size: usize) -> Self {
        Self {
            parser: None,
            max_log_size,
            partial: Vec::new(),
            partial_len: 0,
            partial_start: 0,
        }
    }

    /// Run `parser` over every framed record
    pub fn with_parser(mut self, parser: Box<dyn Parser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Build the parser selected by the configuration
    pub fn from_config(config: &FollowConfig) -> Result<Self> {
        let line_parser: Option<Box<dyn Parser>> = match config.parser {
            ParserType::None => None,
            ParserType::Json => Some(Box::new(
                JsonParser::new().with_lenient(config.json_lenient),
            )),
            ParserType::Regex => {
                let pattern = config
                    .regex_pattern
                    .as_ref()
                    .ok_or_else(|| Error::Config("Regex pattern required".to_string()))?;
                let mut parser = RegexParser::new(pattern)?;
                if let (Some(field), Some(format)) = (
                    &config.regex_timestamp_field,
                    &config.regex_timestamp_format,
                ) {
                    parser = parser.with_timestamp(field, format);
                }
                Some(Box::new(parser))
            }
        };

        let framer = Self::new(config.max_log_size);
        Ok(match line_parser {
            Some(p) => framer.with_parser(p),
            None => framer,
        })
    }

    /// Number of bytes held back as an incomplete record
    pub fn pending_bytes(&self) -> u64 {
        self.partial_len
    }

    fn push_partial(&mut self, bytes: &[u8]) {
        let room = self.max_log_size.saturating_sub(self.partial.len());
        self.partial
            .extend_from_slice(&bytes[..bytes.len().min(room)]);
        self.partial_len += bytes.len() as u64;
    }

    /// Finish the current record: its terminating newline was just seen.
    fn complete_record(&mut self, on_entry: &mut dyn FnMut(Entry)) {
        let total_len = self.partial_len + 1;
        let location = LineOffset::new(
            self.partial_start,
            u32::try_from(total_len).unwrap_or(u32::MAX),
        );

        let mut bytes = self.partial.as_slice();
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }

        if !bytes.is_empty() {
            let line = String::from_utf8_lossy(bytes).into_owned();

            match &self.parser {
                Some(parser) => match parser.parse(Entry::from_line(line, location)) {
                    Ok(parsed) => on_entry(parsed),
                    Err(e) => {
                        // Skip unparseable records but keep reading
                        debug!(offset = location.offset, "Parse error: {}", e);
                    }
                },
                None => {
                    let severity = Severity::sniff(&line);
                    let mut entry = Entry::from_line(line, location);
                    entry.severity = severity;
                    on_entry(entry);
                }
            }
        }

        self.partial.clear();
        self.partial_start += total_len;
        self.partial_len = 0;
    }
}

impl EntryParser for LineEntryParser {
    type Entry = Entry;

    fn consume(
        &mut self,
        stream: &mut dyn Read,
        start_offset: u64,
        on_entry: &mut dyn FnMut(Entry),
    ) -> Result<()> {
        if self.partial_len > 0 && self.partial_start + self.partial_len != start_offset {
            debug!(
                partial_start = self.partial_start,
                partial_len = self.partial_len,
                start_offset,
                "Stream does not continue the pending record, discarding it"
            );
            self.reset();
        }
        if self.partial_len == 0 {
            self.partial_start = start_offset;
        }

        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            let mut rest = &chunk[..n];
            while let Some(pos) = rest.iter().position(|b| *b == b'\n') {
                self.push_partial(&rest[..pos]);
                self.complete_record(on_entry);
                rest = &rest[pos + 1..];
            }
            self.push_partial(rest);
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.partial.clear();
        self.partial_len = 0;
        self.partial_start = 0;
    }
}
