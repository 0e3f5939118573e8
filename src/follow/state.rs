// SPDX-License-Identifier: Apache-2.0

//! State shared between the consumer side and the tail loop thread.

use std::fmt;
use std::path::PathBuf;

use crate::follow::offset_tracker::OffsetTracker;

/// Where the tail loop currently is in its cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoopState {
    /// No loop has been started yet
    #[default]
    Idle,
    /// Opening the file and measuring its size
    Opening,
    /// Handing bytes to the parser
    Reading,
    /// Blocked until the follower is resumed or stopped
    WaitingPaused,
    /// Idle delay between cycles
    Sleeping,
    /// The loop has exited
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Opening => "opening",
            LoopState::Reading => "reading",
            LoopState::WaitingPaused => "waiting_paused",
            LoopState::Sleeping => "sleeping",
            LoopState::Stopped => "stopped",
        };
        write!(f, "{}", name)
    }
}

/// Everything the consumer and the loop thread both touch. Only ever read or
/// written while holding the pause gate's mutex.
#[derive(Debug, Default)]
pub(crate) struct FollowState {
    pub(crate) path: Option<PathBuf>,
    pub(crate) offsets: OffsetTracker,
    pub(crate) file_size: u64,
    pub(crate) paused: bool,
    pub(crate) stop_requested: bool,
    pub(crate) loop_state: LoopState,
}

impl FollowState {
    pub(crate) fn new(paused: bool) -> Self {
        Self {
            paused,
            ..Default::default()
        }
    }

    /// Forget everything learned about the current file.
    pub(crate) fn reset_file(&mut self) {
        self.offsets.reset();
        self.file_size = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_unset() {
        let state = FollowState::new(true);
        assert!(state.paused);
        assert!(!state.stop_requested);
        assert_eq!(state.path, None);
        assert_eq!(state.offsets.offset(), None);
        assert_eq!(state.loop_state, LoopState::Idle);
    }

    #[test]
    fn test_reset_file_keeps_pause_flag() {
        let mut state = FollowState::new(false);
        state.offsets.commit(42);
        state.file_size = 42;

        state.reset_file();
        assert_eq!(state.offsets.offset(), None);
        assert_eq!(state.file_size, 0);
        assert!(!state.paused);
    }

    #[test]
    fn test_loop_state_display() {
        assert_eq!(LoopState::WaitingPaused.to_string(), "waiting_paused");
        assert_eq!(LoopState::Stopped.to_string(), "stopped");
    }
}
