//! Simulated task executor.
//!
//! Stands in for a real worker fleet: consumes dispatched tasks,
//! pretends to work on each one for a fixed duration, then reports the
//! outcome on the completion channel. Task types can be marked as
//! failing to exercise the failure path end to end.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::channel::{CompletionEvent, CompletionSender};
use crate::core::Task;

/// Worker loop that executes dispatched tasks by simulation.
pub struct SimulatedExecutor {
    /// Channel outcomes are reported on.
    completions: CompletionSender,
    /// Simulated work duration per task.
    work_duration: Duration,
    /// Task types that are forced to fail.
    failing_types: HashSet<String>,
}

impl SimulatedExecutor {
    /// Create an executor reporting on `completions`.
    pub fn new(completions: CompletionSender, work_duration: Duration) -> Self {
        Self {
            completions,
            work_duration,
            failing_types: HashSet::new(),
        }
    }

    /// Force every task of `task_type` to fail.
    pub fn fail_task_type(mut self, task_type: &str) -> Self {
        self.failing_types.insert(task_type.to_string());
        self
    }

    /// Consume dispatched tasks until the channel closes.
    ///
    /// Tasks are worked one at a time in delivery order.
    pub async fn run(self, mut deliveries: mpsc::Receiver<Task>) {
        info!("executor started");
        while let Some(task) = deliveries.recv().await {
            debug!(
                task_id = %task.id,
                task_type = %task.task_type,
                "executing task"
            );
            tokio::time::sleep(self.work_duration).await;

            let success = !self.failing_types.contains(&task.task_type);
            let event = if success {
                CompletionEvent::success(task.id)
            } else {
                CompletionEvent::failure(task.id)
            };

            if self.completions.send(event).await.is_err() {
                // Nobody is listening for outcomes anymore.
                break;
            }
        }
        info!("dispatch channel closed, executor stopped");
    }
}
