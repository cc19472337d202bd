//! In-memory task store for tests, demos, and single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::task::{Task, TaskId};
use crate::error::Error;
use crate::store::TaskStore;
use crate::Result;

/// Task store backed by a map behind an async RwLock.
///
/// Faithful to the durable-store contract: version checks happen under
/// the write lock, so of two racing updates with the same expected
/// version exactly one wins and the other observes a conflict.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    records: RwLock<HashMap<TaskId, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create(&self, mut task: Task) -> Result<Task> {
        let mut records = self.records.write().await;
        if records.contains_key(&task.id) {
            return Err(Error::TaskExists { id: task.id });
        }
        task.version = 1;
        records.insert(task.id, task.clone());
        Ok(task)
    }

    async fn fetch(&self, id: &TaskId) -> Result<Task> {
        let records = self.records.read().await;
        records
            .get(id)
            .cloned()
            .ok_or(Error::TaskNotFound { id: *id })
    }

    async fn update(&self, mut task: Task, expected_version: u64) -> Result<Task> {
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&task.id)
            .ok_or(Error::TaskNotFound { id: task.id })?;
        if stored.version != expected_version {
            return Err(Error::VersionConflict {
                id: task.id,
                expected: expected_version,
                stored: stored.version,
            });
        }
        task.version = expected_version + 1;
        *stored = task.clone();
        Ok(task)
    }
}
