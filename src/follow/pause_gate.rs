// SPDX-License-Identifier: Apache-2.0

//! Pause/resume/stop synchronization between the consumer and the tail loop.
//!
//! The gate owns the single mutex guarding [`FollowState`] together with the
//! condition variable the loop thread blocks on. Every change that can end a
//! wait (`set_paused(false)`, `request_stop()`) notifies all waiters while
//! still holding the mutex, so a waiter that has already checked the
//! condition cannot miss it. The wait timeout is only a backstop.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::follow::state::{FollowState, LoopState};

/// How a call to [`PauseGate::wait_while_active_pause`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The gate was not paused; nothing to wait for
    NotPaused,
    /// The gate was paused and has since been resumed
    Resumed,
    /// Stop was requested (before or during the wait)
    Stopped,
}

struct Shared {
    state: Mutex<FollowState>,
    wake: Condvar,
}

/// Cloneable handle to the shared follow state and its condition variable.
#[derive(Clone)]
pub struct PauseGate {
    shared: Arc<Shared>,
}

impl PauseGate {
    pub fn new(paused: bool) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(FollowState::new(paused)),
                wake: Condvar::new(),
            }),
        }
    }

    /// Lock the shared state. A panic on another thread while holding the
    /// lock does not make the plain-data state unusable, so poisoning is
    /// ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, FollowState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_paused(&self) -> bool {
        self.lock().paused
    }

    /// Set the pause flag. Returns true only if the value actually changed.
    pub fn set_paused(&self, paused: bool) -> bool {
        let mut state = self.lock();
        if state.paused == paused {
            return false;
        }
        state.paused = paused;
        if !paused {
            self.shared.wake.notify_all();
        }
        true
    }

    /// Latch the stop request for the current loop lifetime and wake anyone
    /// blocked on the gate.
    pub fn request_stop(&self) {
        let mut state = self.lock();
        state.stop_requested = true;
        self.shared.wake.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.lock().stop_requested
    }

    /// Clear the stop latch before a new loop lifetime begins. Only the
    /// controller calls this, and only when no loop thread is alive.
    pub(crate) fn rearm(&self) {
        self.lock().stop_requested = false;
    }

    /// Block while `paused && !stop_requested`.
    ///
    /// The condition is re-checked after every wake, so spurious wakeups and
    /// expiries of `timeout_hint` never end the wait early.
    pub fn wait_while_active_pause(&self, timeout_hint: Duration) -> WaitOutcome {
        let mut state = self.lock();
        if state.stop_requested {
            return WaitOutcome::Stopped;
        }
        if !state.paused {
            return WaitOutcome::NotPaused;
        }

        state.loop_state = LoopState::WaitingPaused;
        while state.paused && !state.stop_requested {
            let (guard, _timeout) = self
                .shared
                .wake
                .wait_timeout(state, timeout_hint)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }

        if state.stop_requested {
            WaitOutcome::Stopped
        } else {
            WaitOutcome::Resumed
        }
    }

    /// Sleep for `delay` unless stop is requested first. Returns true if the
    /// sleep was cut short by a stop request.
    pub fn sleep_unless_stopped(&self, delay: Duration) -> bool {
        let deadline = Instant::now() + delay;
        let mut state = self.lock();
        while !state.stop_requested {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _timeout) = self
                .shared
                .wake
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        true
    }
}
