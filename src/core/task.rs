//! Task data model for the orchestration engine.
//!
//! Tasks are the atomic units of work handed to external executors. Each
//! task tracks its lifecycle status, owning workflow, timestamps, and the
//! optimistic-concurrency version of its durable record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::workflow::WorkflowId;

/// Unique identifier for a task.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Create a new unique task identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Task status in its lifecycle.
///
/// Statuses only move forward: `Pending → InProgress → {Completed, Failed}`.
/// The valid moves themselves are enforced by the `lifecycle` module; this
/// enum only answers point-in-time questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task persisted but not yet dispatched.
    Pending,
    /// Task dispatched to an executor and awaiting its outcome.
    InProgress,
    /// Executor reported success. Terminal.
    Completed,
    /// Executor reported failure. Terminal.
    Failed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    /// Check if this status is terminal (Completed or Failed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Check if a task in this status may be dispatched.
    pub fn can_start(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    /// Check if a task in this status may accept a completion outcome.
    ///
    /// Pending is accepted as well as InProgress: a completion event can
    /// race ahead of the start acknowledgment on an at-least-once channel.
    pub fn can_complete(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A single task within a workflow.
///
/// The `type` label is opaque to the engine and interpreted by the
/// executor. `version` mirrors the durable record's optimistic-concurrency
/// counter: 0 means never persisted, and every successful store write
/// increments it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Opaque label telling the executor what kind of work to perform.
    #[serde(rename = "type")]
    pub task_type: String,
    /// Back-reference to the owning workflow.
    pub workflow_id: WorkflowId,
    /// Current lifecycle status.
    pub status: TaskStatus,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last modified. Monotonically non-decreasing.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency counter of the durable record.
    pub version: u64,
}

impl Task {
    /// Create a new task with the given type label and owning workflow.
    ///
    /// The task starts Pending with a generated id, current timestamps,
    /// and version 0 (not yet persisted).
    pub fn new(task_type: &str, workflow_id: WorkflowId) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            task_type: task_type.to_string(),
            workflow_id,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Refresh `updated_at` to the current time.
    pub fn touch(&mut self) {
        // The wall clock may step backwards; updated_at must not.
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// Check if the task is in a terminal state (Completed or Failed).
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
