pub mod channel;
pub mod config;
pub mod core;
pub mod error;
pub mod lifecycle;
pub mod store;

// Orchestration engine and the simulated worker side
pub mod executor;
pub mod orchestration;

pub use crate::core::{
    ExecutionMode, Task, TaskId, TaskStatus, Workflow, WorkflowId, WorkflowSpec, WorkflowStatus,
};
pub use channel::CompletionEvent;
pub use error::{Error, Result};
pub use orchestration::{Engine, ReconcileOutcome};
