// SPDX-License-Identifier: Apache-2.0

//! Lifecycle of the tail loop thread.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use crate::follow::config::FollowConfig;
use crate::follow::error::{Error, Result};
use crate::follow::event::{EventSink, FollowEvent, SharedEventSink};
use crate::follow::parser::EntryParser;
use crate::follow::pause_gate::PauseGate;
use crate::follow::state::LoopState;
use crate::follow::tail_loop::TailLoop;

const THREAD_NAME: &str = "logfollow-tail";

/// Follows a single log file on a background thread.
///
/// At most one tail loop runs per follower. The parser is moved into the
/// loop thread while it runs and handed back when the thread is joined, so
/// partial-record state survives a stop/start on the same path. The offset
/// survives too; only [`set_path`](Self::set_path) resets it.
///
/// If the parser panics, the loop thread dies with it and every later
/// [`start`](Self::start) fails with [`Error::LoopPanicked`] until a fresh
/// parser is installed with [`set_parser`](Self::set_parser).
///
/// All operations may be called from any thread that owns the follower.
/// Events are emitted without any internal lock held.
pub struct LogFollower<P: EntryParser + 'static> {
    config: FollowConfig,
    gate: PauseGate,
    sink: SharedEventSink<P::Entry>,
    /// None while a loop thread owns the parser
    parser: Option<P>,
    handle: Option<JoinHandle<P>>,
}

impl<P: EntryParser + 'static> LogFollower<P> {
    /// Create a follower with no path. It starts out paused unless
    /// `config.start_paused` is false.
    pub fn new<S>(config: FollowConfig, parser: P, sink: S) -> Self
    where
        S: EventSink<P::Entry> + 'static,
    {
        Self::with_shared_sink(config, parser, Arc::new(sink))
    }

    pub fn with_shared_sink(
        config: FollowConfig,
        parser: P,
        sink: SharedEventSink<P::Entry>,
    ) -> Self {
        let gate = PauseGate::new(config.start_paused);
        Self {
            config,
            gate,
            sink,
            parser: Some(parser),
            handle: None,
        }
    }

    /// Start the tail loop on the configured path.
    ///
    /// Fails with [`Error::AlreadyRunning`] while a loop is alive and with
    /// [`Error::NoPath`] if no path was set. A loop that already ended on its
    /// own (for example because the file could not be opened) is reaped
    /// first, so calling `start` again retries. Fails with
    /// [`Error::LoopPanicked`] if the previous loop panicked and no
    /// replacement parser was set.
    pub fn start(&mut self) -> Result<()> {
        self.reap_finished();

        let path = self.path().ok_or(Error::NoPath)?;
        if self.handle.is_some() {
            return Err(Error::AlreadyRunning(path));
        }
        let parser = self.parser.take().ok_or(Error::LoopPanicked)?;

        self.gate.rearm();
        let tail = TailLoop::new(
            path.clone(),
            self.gate.clone(),
            parser,
            self.sink.clone(),
            self.config.idle_delay(),
            self.config.pause_wait_hint(),
        );

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || tail.run())
            .map_err(Error::Spawn)?;
        self.handle = Some(handle);

        info!(path = ?path, paused = self.is_paused(), "Log follower started");
        Ok(())
    }

    /// Request the loop to stop and wait for the thread to exit. An
    /// in-progress parse finishes first. Does nothing if no loop exists.
    pub fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.gate.request_stop();
        self.join(handle);
        info!(path = ?self.path(), "Log follower stopped");
    }

    /// Follow a different file. Stops a running loop, forgets the offset,
    /// file size and any partial record, and emits `PathChanged`. Does not
    /// start a new loop. Setting the current path again is a no-op.
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.gate.lock().path.as_ref() == Some(&path) {
            return;
        }

        self.stop();
        {
            let mut state = self.gate.lock();
            state.reset_file();
            state.path = Some(path.clone());
        }
        if let Some(parser) = self.parser.as_mut() {
            parser.reset();
        }

        debug!(path = ?path, "Log file path changed");
        self.sink.emit(FollowEvent::PathChanged(path));
    }

    /// Pause or resume consumption. Returns true and emits `PausedChanged`
    /// only if the flag actually changed.
    pub fn set_paused(&self, paused: bool) -> bool {
        if !self.gate.set_paused(paused) {
            return false;
        }
        debug!(paused, "Pause state changed");
        self.sink.emit(FollowEvent::PausedChanged(paused));
        true
    }

    /// Replace the parser used by the next loop. The offset is kept, so the
    /// new parser picks up where the old one stopped. Fails with
    /// [`Error::AlreadyRunning`] while a loop is alive.
    pub fn set_parser(&mut self, parser: P) -> Result<()> {
        self.reap_finished();
        if self.handle.is_some() {
            return Err(Error::AlreadyRunning(self.path().unwrap_or_default()));
        }
        self.parser = Some(parser);
        Ok(())
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.gate.lock().path.clone()
    }

    /// Size of the file observed at the start of the last cycle.
    pub fn file_size(&self) -> u64 {
        self.gate.lock().file_size
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Bytes already delivered to the parser, None before the first cycle.
    pub fn offset(&self) -> Option<u64> {
        self.gate.lock().offsets.offset()
    }

    pub fn loop_state(&self) -> LoopState {
        self.gate.lock().loop_state
    }

    /// Whether a loop thread exists and has not exited yet.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn config(&self) -> &FollowConfig {
        &self.config
    }

    fn reap_finished(&mut self) {
        if let Some(handle) = self.handle.take_if(|h| h.is_finished()) {
            debug!("Reaping finished tail loop");
            self.join(handle);
        }
    }

    fn join(&mut self, handle: JoinHandle<P>) {
        match handle.join() {
            Ok(parser) => self.parser = Some(parser),
            Err(_) => {
                error!("Tail loop thread panicked");
                self.gate.lock().loop_state = LoopState::Stopped;
            }
        }
    }
}

impl<P: EntryParser + 'static> Drop for LogFollower<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
