//! Task dispatch.
//!
//! The dispatcher hands tasks to workers: it marks a task in progress,
//! persists that transition, then publishes the task on the dispatch
//! channel. Sequential workflows dispatch their head task only;
//! parallel workflows fan every task out at once. Callers hold the
//! owning workflow's lock across these calls.

use std::sync::Arc;

use futures::future;
use tracing::{debug, info};

use crate::channel::DispatchChannel;
use crate::core::{ExecutionMode, Task, TaskId, TaskStatus, Workflow};
use crate::error::Result;
use crate::lifecycle;
use crate::orchestration::commit::commit_transition;
use crate::store::TaskStore;

/// Dispatches tasks to the worker channel.
pub struct Dispatcher {
    /// Durable task records.
    store: Arc<dyn TaskStore>,
    /// Outbound channel workers consume from.
    channel: Arc<dyn DispatchChannel>,
    /// Bound on optimistic persistence retries.
    max_version_retries: u32,
}

impl Dispatcher {
    /// Create a new dispatcher.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable task records
    /// * `channel` - Channel tasks are published on
    /// * `max_version_retries` - Retry bound for version conflicts
    pub fn new(
        store: Arc<dyn TaskStore>,
        channel: Arc<dyn DispatchChannel>,
        max_version_retries: u32,
    ) -> Self {
        Self {
            store,
            channel,
            max_version_retries,
        }
    }

    /// Kick off a freshly registered workflow.
    ///
    /// Sequential workflows dispatch the task at index zero; parallel
    /// workflows dispatch every task concurrently. Returns the number
    /// of tasks published. A workflow with no tasks dispatches nothing.
    pub async fn start_workflow(&self, workflow: &mut Workflow) -> Result<usize> {
        match workflow.mode {
            ExecutionMode::Sequential => match workflow.tasks.first_mut() {
                Some(head) => Ok(usize::from(self.dispatch(head).await?)),
                None => Ok(0),
            },
            ExecutionMode::Parallel => {
                let results =
                    future::join_all(workflow.tasks.iter_mut().map(|task| self.dispatch(task)))
                        .await;

                // Every task gets its dispatch attempt; the first error
                // surfaces once all attempts have finished.
                let mut dispatched = 0;
                let mut first_err = None;
                for result in results {
                    match result {
                        Ok(true) => dispatched += 1,
                        Ok(false) => {}
                        Err(err) => {
                            if first_err.is_none() {
                                first_err = Some(err);
                            }
                        }
                    }
                }
                match first_err {
                    Some(err) => Err(err),
                    None => Ok(dispatched),
                }
            }
        }
    }

    /// Dispatch the task following `completed` in a sequential workflow.
    ///
    /// Returns `true` when a next task was published. Parallel
    /// workflows have no chain to advance, and a next task that is no
    /// longer pending was already claimed by someone else; both cases
    /// return `false`.
    pub async fn continue_after(
        &self,
        workflow: &mut Workflow,
        completed: &TaskId,
    ) -> Result<bool> {
        if workflow.mode != ExecutionMode::Sequential {
            return Ok(false);
        }

        let index = match workflow.task_index(completed) {
            Some(index) => index,
            None => return Ok(false),
        };

        let next = match workflow.tasks.get_mut(index + 1) {
            Some(next) => next,
            None => return Ok(false),
        };

        if next.status != TaskStatus::Pending {
            debug!(
                task_id = %next.id,
                status = %next.status,
                "next task already claimed, skipping dispatch"
            );
            return Ok(false);
        }

        self.dispatch(next).await
    }

    /// Mark a task in progress, persist it, and publish it.
    ///
    /// When the start transition is a no-op the publish is skipped. A
    /// failed publish leaves the task in progress and is not retried;
    /// the error propagates to the caller.
    async fn dispatch(&self, task: &mut Task) -> Result<bool> {
        let transition = commit_transition(
            self.store.as_ref(),
            task,
            self.max_version_retries,
            lifecycle::start,
        )
        .await?;

        if !transition.changed() {
            debug!(task_id = %task.id, status = %task.status, "task already started, skipping dispatch");
            return Ok(false);
        }

        self.channel.publish(task).await?;
        info!(
            task_id = %task.id,
            task_type = %task.task_type,
            workflow_id = %task.workflow_id,
            "task dispatched"
        );
        Ok(true)
    }
}
