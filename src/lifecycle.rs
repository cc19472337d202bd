//! Task lifecycle state machine with idempotency guards.
//!
//! This module provides the pure transition logic for the task lifecycle:
//!
//! Pending -> InProgress -> {Completed, Failed}
//!
//! Completed and Failed are terminal. No transition moves a task backward.
//! Invalid moves are not errors: an at-least-once channel can redeliver a
//! start signal or a completion event, so the guards turn a repeated event
//! into an explicit no-op outcome that callers can observe and skip.

use crate::core::task::{Task, TaskStatus};

/// Outcome of applying a lifecycle transition to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The task moved from one status to another.
    Applied {
        /// Status before the transition.
        from: TaskStatus,
        /// Status after the transition.
        to: TaskStatus,
    },
    /// Start requested but the task already left Pending. Duplicate
    /// dispatch-start signal; nothing changed.
    AlreadyStarted {
        /// The status observed at the time of the request.
        status: TaskStatus,
    },
    /// Completion requested but the task is already terminal. Duplicate
    /// completion delivery; nothing changed.
    AlreadyTerminal {
        /// The status observed at the time of the request.
        status: TaskStatus,
    },
}

impl Transition {
    /// Check whether the transition actually changed the task.
    pub fn changed(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }

    /// The status the task holds after the transition was evaluated.
    pub fn status(&self) -> TaskStatus {
        match self {
            Transition::Applied { to, .. } => *to,
            Transition::AlreadyStarted { status } => *status,
            Transition::AlreadyTerminal { status } => *status,
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Applied { from, to } => write!(f, "{} -> {}", from, to),
            Transition::AlreadyStarted { status } => write!(f, "no-op (already {})", status),
            Transition::AlreadyTerminal { status } => write!(f, "no-op (already {})", status),
        }
    }
}

/// Move a task from Pending to InProgress, refreshing `updated_at`.
///
/// If the task is not Pending the call is a no-op: the task was already
/// dispatched (or finished) and a duplicate start signal must not touch it.
pub fn start(task: &mut Task) -> Transition {
    if !task.status.can_start() {
        return Transition::AlreadyStarted {
            status: task.status,
        };
    }

    let from = task.status;
    task.status = TaskStatus::InProgress;
    task.touch();
    Transition::Applied {
        from,
        to: TaskStatus::InProgress,
    }
}

/// Move a task to its terminal status, refreshing `updated_at`.
///
/// Accepted from InProgress, and from Pending as well: a completion event
/// can overtake the start acknowledgment on an at-least-once channel. If
/// the task is already terminal the call is a no-op, which is what makes a
/// redelivered completion event harmless.
pub fn complete(task: &mut Task, success: bool) -> Transition {
    if !task.status.can_complete() {
        return Transition::AlreadyTerminal {
            status: task.status,
        };
    }

    let from = task.status;
    let to = if success {
        TaskStatus::Completed
    } else {
        TaskStatus::Failed
    };
    task.status = to;
    task.touch();
    Transition::Applied { from, to }
}
