//! Workflow orchestration.
//!
//! This module coordinates workflow execution: the registry owns live
//! workflows, the dispatcher hands tasks to workers over the dispatch
//! channel, the reconciler folds worker completion events back in, and
//! the engine fronts all of it behind one handle.

mod commit;
mod dispatcher;
mod engine;
mod reconciler;
mod registry;

pub use dispatcher::Dispatcher;
pub use engine::Engine;
pub use reconciler::{CompletionReconciler, ReconcileOutcome};
pub use registry::{WorkflowHandle, WorkflowRegistry};
