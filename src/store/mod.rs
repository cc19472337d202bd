//! Durable task record storage.
//!
//! The engine persists every task transition through the `TaskStore`
//! contract before acting on it. Implementations enforce optimistic
//! versioning: an update carrying a stale version is rejected so a
//! concurrent writer is detected instead of silently overwritten.

mod memory;

pub use memory::InMemoryTaskStore;

use async_trait::async_trait;

use crate::core::task::{Task, TaskId};
use crate::Result;

/// Keyed storage for task records with optimistic concurrency.
///
/// The engine holds implementations as `Arc<dyn TaskStore>`; all methods
/// take `&self` and implementations must be safe to share across tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persist a new record. The stored copy is returned with version 1.
    ///
    /// Fails with `Error::TaskExists` if a record with the same id is
    /// already present.
    async fn create(&self, task: Task) -> Result<Task>;

    /// Fetch a record by id, or `Error::TaskNotFound`.
    async fn fetch(&self, id: &TaskId) -> Result<Task>;

    /// Replace a record, comparing `expected_version` against the stored
    /// version first.
    ///
    /// On success the record is stored with version `expected_version + 1`
    /// and returned. Fails with `Error::VersionConflict` if the stored
    /// version differs, and `Error::TaskNotFound` if the record is absent.
    async fn update(&self, task: Task, expected_version: u64) -> Result<Task>;
}
