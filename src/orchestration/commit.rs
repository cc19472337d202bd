//! Optimistic persistence of lifecycle transitions.
//!
//! A transition is applied to an in-memory task slot and written to the
//! store with the version the slot was read at. When another writer got
//! there first, the slot is refreshed from the store and the transition
//! is re-applied. A refresh that lands on a terminal record turns the
//! write into a no-op, which is how repeated completion deliveries are
//! absorbed.

use tracing::debug;

use crate::core::Task;
use crate::error::{Error, Result};
use crate::lifecycle::Transition;
use crate::store::TaskStore;

/// Apply a transition to `task` and persist it, retrying through
/// version conflicts up to `max_retries` times.
///
/// The task must already exist in the store. On success the slot holds
/// the stored record, version included. A transition that does not
/// change the task is returned without touching the store.
pub(crate) async fn commit_transition<F>(
    store: &dyn TaskStore,
    task: &mut Task,
    max_retries: u32,
    apply: F,
) -> Result<Transition>
where
    F: Fn(&mut Task) -> Transition,
{
    let mut attempts = 0;

    loop {
        let expected = task.version;
        let mut candidate = task.clone();
        let transition = apply(&mut candidate);

        if !transition.changed() {
            return Ok(transition);
        }

        match store.update(candidate, expected).await {
            Ok(stored) => {
                *task = stored;
                return Ok(transition);
            }
            Err(Error::VersionConflict { .. }) if attempts < max_retries => {
                attempts += 1;
                debug!(
                    task_id = %task.id,
                    attempt = attempts,
                    "version conflict, refreshing task before retry"
                );
                *task = store.fetch(&task.id).await?;
            }
            Err(err) => return Err(err),
        }
    }
}
