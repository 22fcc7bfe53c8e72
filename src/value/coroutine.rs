//! Execution state for running coroutines
//!
//! One `Execution` is created per `run` of a compiled coroutine. It is made
//! current for the coroutine's dynamic extent (see `crate::context`) so the
//! breakpoint handlers can record when control leaves and re-enters the body.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

static EXECUTION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Coroutine execution state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Evaluating in direct style; no suspension pending
    Running,
    /// A breakpoint call has been issued and control returned to its caller
    Suspended,
    /// A continuation was invoked; its work may still be queued
    Resumed,
    /// Resolve was invoked
    Completed,
    /// Reject was invoked
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionState::Completed | ExecutionState::Failed)
    }

    /// Keyword spelling returned by `execution-state`
    pub fn name(self) -> &'static str {
        match self {
            ExecutionState::Running => "running",
            ExecutionState::Suspended => "suspended",
            ExecutionState::Resumed => "resumed",
            ExecutionState::Completed => "completed",
            ExecutionState::Failed => "failed",
        }
    }
}

/// Tracks one execution of a coroutine
#[derive(Debug)]
pub struct Execution {
    id: u64,
    state: Cell<ExecutionState>,
}

impl Execution {
    pub fn new() -> Self {
        Execution {
            id: EXECUTION_COUNTER.fetch_add(1, Ordering::Relaxed),
            state: Cell::new(ExecutionState::Running),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> ExecutionState {
        self.state.get()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.get().is_terminal()
    }

    /// A breakpoint handed its continuations to an external operation
    pub fn suspend(&self) {
        self.transition(ExecutionState::Suspended);
    }

    /// One of those continuations was invoked
    pub fn resume(&self) {
        self.transition(ExecutionState::Resumed);
    }

    /// The resumed work started executing
    pub fn run(&self) {
        self.transition(ExecutionState::Running);
    }

    /// Record a terminal delivery.
    ///
    /// Returns false when the execution had already reached a terminal
    /// state. Double delivery is a contract violation by some breakpoint
    /// operation; it is reported but not prevented.
    pub fn finish(&self, outcome: ExecutionState) -> bool {
        debug_assert!(outcome.is_terminal());
        let previous = self.state.get();
        if previous.is_terminal() {
            warn!(
                execution = self.id,
                previous = previous.name(),
                outcome = outcome.name(),
                "coroutine delivered a second terminal result"
            );
            return false;
        }
        trace!(execution = self.id, from = previous.name(), to = outcome.name(), "execution finished");
        self.state.set(outcome);
        true
    }

    fn transition(&self, next: ExecutionState) {
        let previous = self.state.get();
        if previous.is_terminal() {
            trace!(
                execution = self.id,
                state = previous.name(),
                ignored = next.name(),
                "transition after terminal state ignored"
            );
            return;
        }
        if previous != next {
            trace!(execution = self.id, from = previous.name(), to = next.name(), "execution state");
            self.state.set(next);
        }
    }
}

impl Default for Execution {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<execution {} {}>", self.id, self.state().name())
    }
}
