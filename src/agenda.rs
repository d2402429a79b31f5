//! Delta-cycle scheduling.
//!
//! The agenda is a strict FIFO of deferred units. Units queued while the
//! agenda drains run after everything already queued, which gives
//! breadth-first settling: every reaction of one delta cycle fires before
//! any reaction it causes.

use crate::circuit::Circuit;
use crate::error::Result;
use crate::signal::Signal;
use crate::types::{ComponentId, WireId};
use std::collections::VecDeque;
use std::fmt;

/// Caller-supplied unit of deferred work
pub type Deferred = Box<dyn FnOnce(&mut Circuit) -> Result<()>>;

/// One queued unit of work.
pub enum Task {
    /// Apply a value to a wire and notify its listeners
    Apply { wire: WireId, signal: Signal },
    /// Run a component's reaction
    React(ComponentId),
    /// Arbitrary caller-supplied unit
    Call(Deferred),
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Apply { wire, signal } => write!(f, "Apply({} <- {})", wire, signal),
            Task::React(id) => write!(f, "React({})", id),
            Task::Call(_) => write!(f, "Call"),
        }
    }
}

/// FIFO queue plus the running flag polled between units.
#[derive(Debug, Default)]
pub struct Agenda {
    queue: VecDeque<Task>,
    running: bool,
}

impl Agenda {
    pub fn new() -> Self {
        Agenda::default()
    }

    pub fn add(&mut self, task: Task) {
        self.queue.push_back(task);
    }

    pub(crate) fn pop(&mut self) -> Option<Task> {
        self.queue.pop_front()
    }

    pub(crate) fn retain(&mut self, keep: impl FnMut(&Task) -> bool) {
        self.queue.retain(keep);
    }

    /// Marks the drain as started; `false` when a drain is already active.
    pub(crate) fn begin(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        true
    }

    pub(crate) fn finish(&mut self) {
        self.running = false;
    }

    /// Halts the active drain after the unit currently executing.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
