//! Completion reconciliation.
//!
//! Workers report task outcomes as completion events. The reconciler
//! routes each event to the owning workflow, commits the terminal
//! transition, and advances sequential workflows past the completed
//! task. Events for tasks no registered workflow owns are discarded.
//! A failure event settles its task and leaves the rest of the
//! workflow where it stands.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::CompletionEvent;
use crate::core::TaskId;
use crate::error::Result;
use crate::lifecycle;
use crate::orchestration::commit::commit_transition;
use crate::orchestration::dispatcher::Dispatcher;
use crate::orchestration::registry::WorkflowRegistry;
use crate::store::TaskStore;

/// What reconciling a single completion event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The task completed; `continued` is true when a follow-up task
    /// was dispatched.
    TaskCompleted { task_id: TaskId, continued: bool },
    /// The task failed; its workflow makes no further progress.
    TaskFailed { task_id: TaskId },
    /// The event repeated an outcome already applied; nothing changed.
    Duplicate { task_id: TaskId },
    /// No registered workflow owns the task; the event was discarded.
    Unknown { task_id: TaskId },
}

/// Applies completion events to registered workflows.
pub struct CompletionReconciler {
    /// Registry of live workflows.
    registry: Arc<WorkflowRegistry>,
    /// Durable task records.
    store: Arc<dyn TaskStore>,
    /// Dispatcher used to advance sequential workflows.
    dispatcher: Arc<Dispatcher>,
    /// Bound on optimistic persistence retries.
    max_version_retries: u32,
}

impl CompletionReconciler {
    /// Create a new reconciler.
    pub fn new(
        registry: Arc<WorkflowRegistry>,
        store: Arc<dyn TaskStore>,
        dispatcher: Arc<Dispatcher>,
        max_version_retries: u32,
    ) -> Self {
        Self {
            registry,
            store,
            dispatcher,
            max_version_retries,
        }
    }

    /// Reconcile one completion event.
    ///
    /// The owning workflow's lock is held from before the terminal
    /// transition until after any follow-up dispatch, so two events for
    /// the same workflow cannot interleave between those steps.
    pub async fn on_event(&self, event: CompletionEvent) -> Result<ReconcileOutcome> {
        let (workflow_id, handle) = match self.registry.resolve(&event.task_id).await {
            Some(found) => found,
            None => {
                warn!(task_id = %event.task_id, "completion event for unknown task, discarding");
                return Ok(ReconcileOutcome::Unknown {
                    task_id: event.task_id,
                });
            }
        };

        let mut workflow = handle.lock().await;

        let index = match workflow.task_index(&event.task_id) {
            Some(index) => index,
            // Stale owner entry; treat like an unknown task.
            None => {
                return Ok(ReconcileOutcome::Unknown {
                    task_id: event.task_id,
                })
            }
        };

        let transition = {
            let task = &mut workflow.tasks[index];
            commit_transition(self.store.as_ref(), task, self.max_version_retries, |t| {
                lifecycle::complete(t, event.success)
            })
            .await?
        };

        if !transition.changed() {
            debug!(
                task_id = %event.task_id,
                workflow_id = %workflow_id,
                "completion already applied, absorbing duplicate"
            );
            return Ok(ReconcileOutcome::Duplicate {
                task_id: event.task_id,
            });
        }

        if event.success {
            let continued = self
                .dispatcher
                .continue_after(&mut workflow, &event.task_id)
                .await?;
            info!(
                task_id = %event.task_id,
                workflow_id = %workflow_id,
                continued,
                "task completed"
            );
            Ok(ReconcileOutcome::TaskCompleted {
                task_id: event.task_id,
                continued,
            })
        } else {
            warn!(
                task_id = %event.task_id,
                workflow_id = %workflow_id,
                "task failed, workflow will not advance"
            );
            Ok(ReconcileOutcome::TaskFailed {
                task_id: event.task_id,
            })
        }
    }
}
