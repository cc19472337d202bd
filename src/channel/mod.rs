//! Message channels between the engine and external executors.
//!
//! Outbound: the engine hands tasks to executors through the
//! `DispatchChannel` contract. Inbound: executors report outcomes as
//! `CompletionEvent`s over a bounded mpsc channel feeding the engine's
//! consumer loop. Both directions assume at-least-once delivery, so every
//! consumer must tolerate duplicates.

mod memory;

pub use memory::InMemoryDispatchChannel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::task::{Task, TaskId};
use crate::Result;

/// Durable, at-least-once delivery channel handing tasks to executors.
///
/// A successful return from `publish` means the channel has acknowledged
/// the message durably: it guarantees eventual delivery to exactly one
/// competing consumer, not exactly-once processing.
#[async_trait]
pub trait DispatchChannel: Send + Sync {
    /// Label of the underlying queue, for logs and errors.
    fn name(&self) -> &str;

    /// Publish a task and wait for the channel's acknowledgment.
    ///
    /// Fails with `Error::Channel` on transport failure; the caller
    /// decides what to do with the task's already-persisted state.
    async fn publish(&self, task: &Task) -> Result<()>;
}

/// An inbound notification that a dispatched task finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// The task the executor worked on.
    pub task_id: TaskId,
    /// Whether the executor reports success. A false value is a valid
    /// terminal outcome, not an engine error.
    pub success: bool,
}

impl CompletionEvent {
    /// Event reporting successful completion.
    pub fn success(task_id: TaskId) -> Self {
        Self {
            task_id,
            success: true,
        }
    }

    /// Event reporting failure.
    pub fn failure(task_id: TaskId) -> Self {
        Self {
            task_id,
            success: false,
        }
    }
}

/// Sender half used by executors to report outcomes.
pub type CompletionSender = mpsc::Sender<CompletionEvent>;

/// Receiver half consumed by the engine's reconciler loop.
pub type CompletionReceiver = mpsc::Receiver<CompletionEvent>;

/// Create the bounded completion channel connecting executors to the
/// engine.
pub fn completion_channel(capacity: usize) -> (CompletionSender, CompletionReceiver) {
    mpsc::channel(capacity)
}
