//! Engine facade.
//!
//! The engine wires the registry, dispatcher, and reconciler together
//! behind a small surface: submit a workflow, read workflows back, and
//! feed completion events in. `run` drives the completion consumer
//! loop over a completion channel until it closes.

use std::sync::Arc;

use tracing::{error, info};

use crate::channel::{CompletionEvent, CompletionReceiver, DispatchChannel};
use crate::core::{Workflow, WorkflowId, WorkflowSpec};
use crate::error::{Error, Result};
use crate::orchestration::dispatcher::Dispatcher;
use crate::orchestration::reconciler::{CompletionReconciler, ReconcileOutcome};
use crate::orchestration::registry::WorkflowRegistry;
use crate::store::TaskStore;

/// Workflow orchestration engine.
///
/// One engine instance owns the workflow registry and serves both
/// event sources: submissions arriving through [`Engine::submit`] and
/// worker completions arriving through [`Engine::handle_completion`]
/// or the [`Engine::run`] consumer loop.
pub struct Engine {
    /// Registry of live workflows.
    registry: Arc<WorkflowRegistry>,
    /// Durable task records.
    store: Arc<dyn TaskStore>,
    /// Dispatcher for kicking off and advancing workflows.
    dispatcher: Arc<Dispatcher>,
    /// Reconciler applied to completion events.
    reconciler: CompletionReconciler,
}

impl Engine {
    /// Create an engine on top of a task store and dispatch channel.
    pub fn new(
        store: Arc<dyn TaskStore>,
        channel: Arc<dyn DispatchChannel>,
        max_version_retries: u32,
    ) -> Self {
        let registry = Arc::new(WorkflowRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&store),
            channel,
            max_version_retries,
        ));
        let reconciler = CompletionReconciler::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            max_version_retries,
        );

        Self {
            registry,
            store,
            dispatcher,
            reconciler,
        }
    }

    /// Submit a workflow for execution.
    ///
    /// Tasks are persisted, the workflow is registered, and its first
    /// wave is dispatched. The returned snapshot is the workflow as
    /// accepted, with every task still pending; execution may already
    /// have moved past it by the time the caller looks.
    pub async fn submit(&self, spec: WorkflowSpec) -> Result<Workflow> {
        let mut workflow = spec.build();
        info!(
            workflow_id = %workflow.id,
            name = %workflow.name,
            mode = %workflow.mode,
            tasks = workflow.tasks.len(),
            "workflow submitted"
        );

        for task in &mut workflow.tasks {
            *task = self.store.create(task.clone()).await?;
        }

        let accepted = workflow.clone();
        let handle = self.registry.register(workflow).await;

        let mut live = handle.lock().await;
        self.dispatcher.start_workflow(&mut live).await?;

        Ok(accepted)
    }

    /// Fetch a workflow with its task statuses refreshed from the store.
    pub async fn workflow(&self, id: &WorkflowId) -> Result<Workflow> {
        let mut workflow = match self.registry.get(id).await {
            Some(workflow) => workflow,
            None => return Err(Error::WorkflowNotFound { id: *id }),
        };

        // Store records are authoritative for status reads.
        for task in &mut workflow.tasks {
            *task = self.store.fetch(&task.id).await?;
        }
        Ok(workflow)
    }

    /// Snapshot every registered workflow, oldest first.
    pub async fn workflows(&self) -> Vec<Workflow> {
        self.registry.list().await
    }

    /// Apply one completion event.
    pub async fn handle_completion(&self, event: CompletionEvent) -> Result<ReconcileOutcome> {
        self.reconciler.on_event(event).await
    }

    /// Consume completion events until the channel closes.
    ///
    /// Reconciliation errors are logged and the loop keeps going; one
    /// poisoned event must not take the consumer down.
    pub async fn run(&self, mut events: CompletionReceiver) {
        info!("completion consumer started");
        while let Some(event) = events.recv().await {
            if let Err(err) = self.handle_completion(event).await {
                error!(
                    task_id = %event.task_id,
                    error = %err,
                    "failed to reconcile completion event"
                );
            }
        }
        info!("completion channel closed, consumer stopped");
    }
}
