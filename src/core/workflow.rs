//! Workflow data model and submission records.
//!
//! A workflow is an ordered, fixed-at-start collection of tasks executed
//! either sequentially or as a parallel fan-out. Workflow-level status is
//! derived from the task statuses rather than stored, so it cannot drift
//! from the task records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::task::{Task, TaskId, TaskStatus};

/// Unique identifier for a workflow instance.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub Uuid);

impl WorkflowId {
    /// Create a new unique workflow identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for WorkflowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How a workflow's tasks are handed to executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Tasks run one at a time in list order; each task is dispatched
    /// only after its predecessor completes successfully.
    #[default]
    Sequential,
    /// Every task is dispatched at start; completions arrive in any order.
    Parallel,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Sequential => write!(f, "sequential"),
            ExecutionMode::Parallel => write!(f, "parallel"),
        }
    }
}

/// Workflow-level status, derived from task statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// No task has been dispatched yet.
    #[default]
    Pending,
    /// At least one task has left Pending and none has failed.
    Running,
    /// Every task completed successfully.
    Completed,
    /// At least one task failed.
    Failed,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::Pending => write!(f, "pending"),
            WorkflowStatus::Running => write!(f, "running"),
            WorkflowStatus::Completed => write!(f, "completed"),
            WorkflowStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A registered workflow: an ordered task list plus its execution mode.
///
/// The task sequence is fixed at start time; tasks are never added or
/// removed afterwards. Order is meaningful in sequential mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Dispatch policy for the task list.
    pub mode: ExecutionMode,
    /// Ordered task list. Index order is the execution order in
    /// sequential mode.
    pub tasks: Vec<Task>,
    /// When the workflow was created.
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Position of a task within this workflow's task list.
    pub fn task_index(&self, task_id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == *task_id)
    }

    /// Derive the workflow-level status from the task statuses.
    ///
    /// An empty task list reads as Completed: there is nothing left to do.
    pub fn status(&self) -> WorkflowStatus {
        if self.tasks.iter().any(|t| t.status == TaskStatus::Failed) {
            return WorkflowStatus::Failed;
        }
        if self.tasks.iter().all(|t| t.status == TaskStatus::Completed) {
            return WorkflowStatus::Completed;
        }
        if self.tasks.iter().all(|t| t.status == TaskStatus::Pending) {
            return WorkflowStatus::Pending;
        }
        WorkflowStatus::Running
    }

    /// Check whether the workflow has reached quiescence: no task is in
    /// progress and no further dispatch will happen without external
    /// intervention.
    ///
    /// True when every task completed, or when a task failed and nothing
    /// is still running. A failed sequential workflow settles with its
    /// remaining tasks left Pending forever; a failed parallel workflow
    /// settles once its surviving tasks finish.
    pub fn is_settled(&self) -> bool {
        let none_running = self
            .tasks
            .iter()
            .all(|t| t.status != TaskStatus::InProgress);
        let any_failed = self.tasks.iter().any(|t| t.status == TaskStatus::Failed);
        let all_completed = self
            .tasks
            .iter()
            .all(|t| t.status == TaskStatus::Completed);
        none_running && (any_failed || all_completed)
    }
}

/// Submission record for a single task: just the executor-facing label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Opaque label telling the executor what kind of work to perform.
    #[serde(rename = "type")]
    pub task_type: String,
}

/// Submission record for a workflow, as received from a caller or parsed
/// from a definition file.
///
/// `build` mints the actual Workflow with fresh ids and timestamps; the
/// spec itself carries no identity, so the same spec can be submitted
/// more than once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSpec {
    /// Human-readable name.
    pub name: String,
    /// Dispatch policy. Defaults to sequential.
    #[serde(default)]
    pub mode: ExecutionMode,
    /// Ordered task labels.
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl WorkflowSpec {
    /// Create an empty spec with the given name and mode.
    pub fn new(name: &str, mode: ExecutionMode) -> Self {
        Self {
            name: name.to_string(),
            mode,
            tasks: Vec::new(),
        }
    }

    /// Append a task label, preserving submission order.
    pub fn with_task(mut self, task_type: &str) -> Self {
        self.tasks.push(TaskSpec {
            task_type: task_type.to_string(),
        });
        self
    }

    /// Mint a Workflow from this spec: fresh workflow id, fresh task ids,
    /// every task Pending with the workflow back-reference set.
    pub fn build(&self) -> Workflow {
        let id = WorkflowId::new();
        let tasks = self
            .tasks
            .iter()
            .map(|spec| Task::new(&spec.task_type, id))
            .collect();
        Workflow {
            id,
            name: self.name.clone(),
            mode: self.mode,
            tasks,
            created_at: Utc::now(),
        }
    }
}
