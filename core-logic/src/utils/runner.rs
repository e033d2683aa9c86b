//! Run state tracking for long-running, cancellable operations.
//!
//! Each workflow kind owns one [`RunController`]. Starting a run hands out a
//! [`RunGuard`] carrying the run's [`CancellationToken`]; dropping the guard
//! puts the controller back to [`RunState::Idle`] no matter how the run ended.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Still running, stop requested. The run exits at its next checkpoint.
    Cancelling,
}

impl RunState {
    pub fn is_active(self) -> bool {
        !matches!(self, RunState::Idle)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Idle => write!(f, "idle"),
            RunState::Running => write!(f, "running"),
            RunState::Cancelling => write!(f, "cancelling"),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    token: Option<CancellationToken>,
}

#[derive(Debug, Clone)]
pub struct RunController {
    name: &'static str,
    slot: Arc<Mutex<Slot>>,
}

impl RunController {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot holds no invariant a panicking holder could break halfway
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Idle -> Running. Returns `None` if a run of this kind is already active.
    pub fn try_start(&self) -> Option<RunGuard> {
        let mut slot = self.lock();
        if slot.token.is_some() {
            debug!("{} run rejected: already {}", self.name, self.state_of(&slot));
            return None;
        }

        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        debug!("{} run started", self.name);

        Some(RunGuard {
            controller: self.clone(),
            token,
        })
    }

    /// Running -> Cancelling. Returns `false` when there is nothing to stop.
    pub fn request_stop(&self) -> bool {
        let slot = self.lock();
        match &slot.token {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                debug!("{} stop requested", self.name);
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> RunState {
        let slot = self.lock();
        self.state_of(&slot)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_active()
    }

    fn state_of(&self, slot: &Slot) -> RunState {
        match &slot.token {
            None => RunState::Idle,
            Some(t) if t.is_cancelled() => RunState::Cancelling,
            Some(_) => RunState::Running,
        }
    }

    fn finish(&self) {
        let mut slot = self.lock();
        slot.token = None;
        debug!("{} run finished", self.name);
    }
}

/// Proof of an active run. Releases the controller on drop.
#[derive(Debug)]
pub struct RunGuard {
    controller: RunController,
    token: CancellationToken,
}

impl RunGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.controller.finish();
    }
}
