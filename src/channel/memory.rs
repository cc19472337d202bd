//! In-memory dispatch channel for tests, demos, and single-process use.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::channel::DispatchChannel;
use crate::core::task::{Task, TaskId};
use crate::error::Error;
use crate::Result;

/// Dispatch channel that records every acknowledged publish and can
/// optionally deliver tasks to a wired consumer.
///
/// The ledger keeps publish order, which is what the dispatch-policy
/// assertions in tests are built on. `set_failing` turns the channel
/// into one that rejects publishes, for exercising transport-failure
/// paths.
pub struct InMemoryDispatchChannel {
    name: String,
    published: Mutex<Vec<Task>>,
    delivery_tx: Option<mpsc::Sender<Task>>,
    failing: AtomicBool,
}

impl InMemoryDispatchChannel {
    /// Channel that only records publishes, with nothing consuming them.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            published: Mutex::new(Vec::new()),
            delivery_tx: None,
            failing: AtomicBool::new(false),
        }
    }

    /// Channel wired to a consumer: acknowledged publishes are also
    /// delivered on the returned receiver, in order, with bounded
    /// backpressure.
    pub fn with_delivery(name: &str, capacity: usize) -> (Self, mpsc::Receiver<Task>) {
        let (tx, rx) = mpsc::channel(capacity);
        let channel = Self {
            name: name.to_string(),
            published: Mutex::new(Vec::new()),
            delivery_tx: Some(tx),
            failing: AtomicBool::new(false),
        };
        (channel, rx)
    }

    /// Make every subsequent publish fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every acknowledged publish, in order.
    pub async fn published(&self) -> Vec<Task> {
        self.published.lock().await.clone()
    }

    /// Ids of every acknowledged publish, in order.
    pub async fn published_ids(&self) -> Vec<TaskId> {
        self.published.lock().await.iter().map(|t| t.id).collect()
    }

    /// Number of acknowledged publishes.
    pub async fn publish_count(&self) -> usize {
        self.published.lock().await.len()
    }
}

#[async_trait]
impl DispatchChannel for InMemoryDispatchChannel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(&self, task: &Task) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Channel {
                name: self.name.clone(),
                reason: "publish rejected".to_string(),
            });
        }

        if let Some(tx) = &self.delivery_tx {
            tx.send(task.clone()).await.map_err(|_| Error::Channel {
                name: self.name.clone(),
                reason: "consumer disconnected".to_string(),
            })?;
        }

        // The ledger only records acknowledged publishes.
        self.published.lock().await.push(task.clone());
        Ok(())
    }
}
