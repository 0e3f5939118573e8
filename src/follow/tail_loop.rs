// SPDX-License-Identifier: Apache-2.0

//! The background read loop.
//!
//! Each cycle opens the file, measures its size, seeks to the position chosen
//! by the offset tracker and hands the bytes up to the measured size to the
//! parser. The file is closed again before the loop waits on the pause gate
//! or sleeps for the idle delay.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::follow::error::Result;
use crate::follow::event::{FollowEvent, SharedEventSink};
use crate::follow::parser::EntryParser;
use crate::follow::pause_gate::{PauseGate, WaitOutcome};
use crate::follow::state::LoopState;

/// How a single cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    /// All bytes up to the observed size were handed to the parser
    Completed,
    /// The file could not be opened; the loop must terminate
    OpenFailed,
}

pub(crate) struct TailLoop<P: EntryParser> {
    path: PathBuf,
    gate: PauseGate,
    parser: P,
    sink: SharedEventSink<P::Entry>,
    idle_delay: Duration,
    pause_wait_hint: Duration,
}

impl<P: EntryParser> TailLoop<P> {
    pub(crate) fn new(
        path: PathBuf,
        gate: PauseGate,
        parser: P,
        sink: SharedEventSink<P::Entry>,
        idle_delay: Duration,
        pause_wait_hint: Duration,
    ) -> Self {
        Self {
            path,
            gate,
            parser,
            sink,
            idle_delay,
            pause_wait_hint,
        }
    }

    /// Run cycles until stop is requested or the file cannot be opened.
    /// Returns the parser so the controller can reuse it for the next loop.
    pub(crate) fn run(mut self) -> P {
        info!(path = ?self.path, "Tail loop started");

        while !self.gate.is_stop_requested() {
            if self.run_cycle() == CycleOutcome::OpenFailed {
                break;
            }

            match self.gate.wait_while_active_pause(self.pause_wait_hint) {
                WaitOutcome::Stopped => break,
                WaitOutcome::Resumed => {
                    debug!(path = ?self.path, "Resumed, starting next cycle");
                }
                WaitOutcome::NotPaused => {
                    self.set_loop_state(LoopState::Sleeping);
                    if self.gate.sleep_unless_stopped(self.idle_delay) {
                        break;
                    }
                }
            }
        }

        self.set_loop_state(LoopState::Stopped);
        info!(path = ?self.path, "Tail loop stopped");
        self.parser
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        self.set_loop_state(LoopState::Opening);

        let (mut file, size) = match open_and_measure(&self.path) {
            Ok(opened) => opened,
            Err(e) => {
                let message = format!("Can't open file: {}: {}", self.path.display(), e);
                warn!(path = ?self.path, "{}", message);
                self.sink.emit(FollowEvent::ErrorOccurred {
                    path: self.path.clone(),
                    message,
                });
                return CycleOutcome::OpenFailed;
            }
        };

        let (decision, size_changed) = {
            let mut state = self.gate.lock();
            let size_changed = state.file_size != size;
            state.file_size = size;
            state.loop_state = LoopState::Reading;
            (state.offsets.seek_for(size), size_changed)
        };

        if size_changed {
            self.sink.emit(FollowEvent::FileSizeChanged(size));
        }

        if decision.truncated {
            info!(
                path = ?self.path,
                size,
                "File shrank below the last offset, reading from start"
            );
            self.parser.reset();
        }

        if decision.position < size {
            debug!(
                path = ?self.path,
                position = decision.position,
                size,
                "Reading appended bytes"
            );
            if let Err(e) = self.consume(&mut file, decision.position, size) {
                warn!(
                    path = ?self.path,
                    position = decision.position,
                    "Failed to read log file: {}",
                    e
                );
                self.sink.emit(FollowEvent::ErrorOccurred {
                    path: self.path.clone(),
                    message: e.to_string(),
                });
            }
        }
        drop(file);

        self.gate.lock().offsets.commit(size);
        self.sink.emit(FollowEvent::CycleEndReached(size));

        CycleOutcome::Completed
    }

    /// Hand the bytes in `position..size` to the parser. Bytes appended
    /// after `size` was measured are left for the next cycle.
    fn consume(&mut self, file: &mut File, position: u64, size: u64) -> Result<()> {
        file.seek(SeekFrom::Start(position))?;
        let mut bounded = file.take(size - position);
        let sink = &self.sink;
        self.parser.consume(&mut bounded, position, &mut |entry| {
            sink.emit(FollowEvent::NewEntry(entry))
        })
    }

    fn set_loop_state(&self, loop_state: LoopState) {
        self.gate.lock().loop_state = loop_state;
    }
}

fn open_and_measure(path: &Path) -> std::io::Result<(File, u64)> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}
