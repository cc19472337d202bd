//! Core domain models for the orchestration engine.
//!
//! This module contains the fundamental data structures used throughout
//! the engine: tasks, workflows, and their submission records.

pub mod task;
pub mod workflow;

pub use task::{Task, TaskId, TaskStatus};
pub use workflow::{ExecutionMode, TaskSpec, Workflow, WorkflowId, WorkflowSpec, WorkflowStatus};
