// SPDX-License-Identifier: Apache-2.0

//! Parser collaborators for the tail loop.
//!
//! The tail loop only knows [`EntryParser`]: something that consumes a byte
//! stream and hands back owned entries through a callback. The crate ships
//! one implementation, [`LineEntryParser`], which frames newline-terminated
//! records and optionally runs a line-level [`Parser`] over each of them:
//!
//! - [`JsonParser`] - extract fields from JSON-formatted lines
//! - [`RegexParser`] - extract fields using named capture groups

mod json;
mod line;
mod regex;
mod traits;

pub use json::JsonParser;
pub use line::LineEntryParser;
pub use regex::RegexParser;
pub use traits::{EntryParser, Parser};
