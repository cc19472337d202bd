use thiserror::Error;

use crate::core::task::TaskId;
use crate::core::workflow::WorkflowId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task not found: {id}")]
    TaskNotFound { id: TaskId },

    #[error("Workflow not found: {id}")]
    WorkflowNotFound { id: WorkflowId },

    #[error("Task already exists: {id}")]
    TaskExists { id: TaskId },

    #[error("Version conflict on task {id}: expected {expected}, stored {stored}")]
    VersionConflict {
        id: TaskId,
        expected: u64,
        stored: u64,
    },

    #[error("Channel error on {name}: {reason}")]
    Channel { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
