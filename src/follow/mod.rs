// SPDX-License-Identifier: Apache-2.0

//! Log file follower.
//!
//! A [`LogFollower`] runs a background loop that polls a single growing log
//! file, hands newly appended bytes to an [`EntryParser`] and streams the
//! resulting entries to an [`EventSink`] as [`FollowEvent`]s. The consumer
//! can pause and resume at any time without losing or repeating entries.
//!
//! Features:
//! - Offset tracking across poll cycles and loop restarts
//! - Truncation detection (the file is read again from the start)
//! - Pause/resume with prompt, cancellable waits
//! - Line, JSON and regex parsers

pub mod config;
pub mod controller;
pub mod entry;
pub mod error;
pub mod event;
pub mod offset_tracker;
pub mod parser;
pub mod pause_gate;
pub mod state;
mod tail_loop;

pub use config::{FollowConfig, ParserType};
pub use controller::LogFollower;
pub use entry::{Entry, Severity};
pub use error::{Error, Result};
pub use event::{EventSink, FollowEvent, SharedEventSink};
pub use offset_tracker::{LineOffset, OffsetTracker, SeekDecision};
pub use parser::{EntryParser, JsonParser, LineEntryParser, Parser, RegexParser};
pub use pause_gate::{PauseGate, WaitOutcome};
pub use state::LoopState;
