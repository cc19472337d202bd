//! In-memory workflow registry.
//!
//! The registry is the arena that owns every workflow accepted by the
//! engine. Each workflow lives behind its own async mutex, so events
//! touching the same workflow serialize while unrelated workflows
//! proceed in parallel. A reverse index maps task ids to their owning
//! workflow for completion routing.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::core::{TaskId, Workflow, WorkflowId};

/// Shared handle to a registered workflow.
///
/// All post-registration mutation of a workflow happens while holding
/// this lock.
pub type WorkflowHandle = Arc<Mutex<Workflow>>;

/// Both maps are guarded by a single lock so a workflow and its owner
/// entries appear and disappear together.
#[derive(Default)]
struct Entries {
    /// Registered workflows by id.
    workflows: HashMap<WorkflowId, WorkflowHandle>,
    /// Reverse index from task id to the workflow that owns it.
    owners: HashMap<TaskId, WorkflowId>,
}

/// Registry of live workflows.
///
/// Registration is last-write-wins: registering a workflow id that is
/// already present replaces the old instance and retargets the owner
/// index to the new task list.
#[derive(Default)]
pub struct WorkflowRegistry {
    entries: RwLock<Entries>,
}

impl WorkflowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Register a workflow and return its shared handle.
    ///
    /// The workflow and all of its task ids become visible to readers
    /// in one step. If the id was already registered, the previous
    /// instance is dropped and its task ids are unindexed first.
    pub async fn register(&self, workflow: Workflow) -> WorkflowHandle {
        let mut entries = self.entries.write().await;

        if entries.workflows.remove(&workflow.id).is_some() {
            entries.owners.retain(|_, owner| *owner != workflow.id);
        }

        for task in &workflow.tasks {
            entries.owners.insert(task.id, workflow.id);
        }

        let handle = Arc::new(Mutex::new(workflow.clone()));
        entries.workflows.insert(workflow.id, Arc::clone(&handle));
        handle
    }

    /// Get a point-in-time snapshot of a workflow.
    pub async fn get(&self, id: &WorkflowId) -> Option<Workflow> {
        let handle = {
            let entries = self.entries.read().await;
            entries.workflows.get(id).cloned()
        };

        match handle {
            Some(handle) => {
                let workflow = handle.lock().await;
                Some(workflow.clone())
            }
            None => None,
        }
    }

    /// Get the live handle for a workflow.
    pub async fn handle(&self, id: &WorkflowId) -> Option<WorkflowHandle> {
        let entries = self.entries.read().await;
        entries.workflows.get(id).cloned()
    }

    /// Resolve a task id to its owning workflow.
    ///
    /// Returns the workflow id and live handle, or `None` when no
    /// registered workflow owns the task.
    pub async fn resolve(&self, task_id: &TaskId) -> Option<(WorkflowId, WorkflowHandle)> {
        let entries = self.entries.read().await;
        let workflow_id = entries.owners.get(task_id)?;
        let handle = entries.workflows.get(workflow_id)?;
        Some((*workflow_id, Arc::clone(handle)))
    }

    /// Check whether a workflow id is registered.
    pub async fn contains(&self, id: &WorkflowId) -> bool {
        let entries = self.entries.read().await;
        entries.workflows.contains_key(id)
    }

    /// Snapshot every registered workflow, oldest first.
    pub async fn list(&self) -> Vec<Workflow> {
        let handles: Vec<WorkflowHandle> = {
            let entries = self.entries.read().await;
            entries.workflows.values().cloned().collect()
        };

        let mut workflows = Vec::with_capacity(handles.len());
        for handle in handles {
            let workflow = handle.lock().await;
            workflows.push(workflow.clone());
        }
        workflows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        workflows
    }

    /// Number of registered workflows.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.workflows.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
