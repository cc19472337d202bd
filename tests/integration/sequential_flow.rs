//! Sequential workflow integration tests.

use conductor::channel::CompletionEvent;
use conductor::core::{TaskStatus, WorkflowStatus};
use conductor::orchestration::ReconcileOutcome;
use conductor::store::TaskStore;

use crate::fixtures::{sequential_spec, EngineHarness, LivePipeline};

/// Test: Sequential Happy Path
///
/// Given a two-task sequential workflow
/// When the worker completes each task in turn
/// Then tasks dispatch one at a time and the workflow settles completed
#[tokio::test]
async fn test_sequential_happy_path() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(sequential_spec("etl", &["extract", "load"]))
        .await
        .unwrap();
    assert_eq!(accepted.tasks.len(), 2);

    // Only the head is dispatched at submission.
    let first = harness.next_delivery().await.expect("head task dispatched");
    assert_eq!(first.id, accepted.tasks[0].id);
    assert_eq!(first.task_type, "extract");
    assert_eq!(
        first.status,
        TaskStatus::InProgress,
        "published copy carries the started task"
    );
    assert!(
        harness.next_delivery().await.is_none(),
        "second task must wait for the first completion"
    );

    // Completing the head dispatches its successor.
    let outcome = harness
        .engine
        .handle_completion(CompletionEvent::success(first.id))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::TaskCompleted {
            task_id: first.id,
            continued: true,
        }
    );
    let second = harness.next_delivery().await.expect("successor dispatched");
    assert_eq!(second.task_type, "load");

    // Completing the tail settles the workflow.
    let outcome = harness
        .engine
        .handle_completion(CompletionEvent::success(second.id))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::TaskCompleted {
            task_id: second.id,
            continued: false,
        }
    );

    let settled = harness.engine.workflow(&accepted.id).await.unwrap();
    assert!(settled.is_settled());
    assert_eq!(settled.status(), WorkflowStatus::Completed);
    for task in &settled.tasks {
        assert_eq!(task.status, TaskStatus::Completed);
        // create, start, complete
        assert_eq!(task.version, 3);
    }
}

/// Test: Strict Dispatch Order
///
/// Given a four-task sequential workflow
/// When completions arrive one by one
/// Then tasks dispatch in list order with at most one in progress
#[tokio::test]
async fn test_tasks_dispatch_strictly_in_order() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(sequential_spec("chain", &["a", "b", "c", "d"]))
        .await
        .unwrap();

    for expected_index in 0..accepted.tasks.len() {
        let delivered = harness.next_delivery().await.expect("task dispatched");
        assert_eq!(
            delivered.id, accepted.tasks[expected_index].id,
            "dispatch must follow list order"
        );

        let current = harness.engine.workflow(&accepted.id).await.unwrap();
        let in_progress = current
            .tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count();
        assert_eq!(in_progress, 1, "exactly one task runs at a time");
        for task in &current.tasks[..expected_index] {
            assert_eq!(task.status, TaskStatus::Completed);
        }
        for task in &current.tasks[expected_index + 1..] {
            assert_eq!(task.status, TaskStatus::Pending);
        }

        harness
            .engine
            .handle_completion(CompletionEvent::success(delivered.id))
            .await
            .unwrap();
    }

    let settled = harness.engine.workflow(&accepted.id).await.unwrap();
    assert_eq!(settled.status(), WorkflowStatus::Completed);
}

/// Test: Duplicate Completion Absorbed
///
/// Given a sequential workflow whose head task completed
/// When the same completion event arrives again
/// Then the duplicate is absorbed and the successor dispatches only once
#[tokio::test]
async fn test_duplicate_completion_dispatches_successor_once() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(sequential_spec("etl", &["extract", "load"]))
        .await
        .unwrap();
    let first = harness.next_delivery().await.expect("head task dispatched");

    harness
        .engine
        .handle_completion(CompletionEvent::success(first.id))
        .await
        .unwrap();
    let outcome = harness
        .engine
        .handle_completion(CompletionEvent::success(first.id))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::Duplicate { task_id: first.id },
        "redelivered completion must be a no-op"
    );

    // Head plus one successor, nothing more.
    assert_eq!(harness.channel.publish_count().await, 2);
    let second = harness.next_delivery().await.expect("successor dispatched");
    assert_eq!(second.id, accepted.tasks[1].id);
    assert!(
        harness.next_delivery().await.is_none(),
        "duplicate must not dispatch the successor again"
    );
}

/// Test: Sequential E2E With Live Worker
///
/// Given a three-task sequential workflow and a running worker
/// When the pipeline executes unattended
/// Then every task completes and versions show the full lifecycle
#[tokio::test]
async fn test_sequential_e2e_with_live_worker() {
    let pipeline = LivePipeline::start(&[]);

    let accepted = pipeline
        .engine
        .submit(sequential_spec("etl", &["extract", "transform", "load"]))
        .await
        .unwrap();

    let settled = pipeline.wait_until_settled(&accepted.id).await;
    assert_eq!(settled.status(), WorkflowStatus::Completed);
    for task in &settled.tasks {
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.version, 3);
    }

    // The durable records agree with the settled view.
    for task in &accepted.tasks {
        let stored = pipeline.store.fetch(&task.id).await.unwrap();
        assert_eq!(stored.status, TaskStatus::Completed);
    }
}

/// Test: Submission Snapshot Is Pre-Dispatch
///
/// Given a sequential workflow submission
/// When submit returns
/// Then the returned snapshot shows every task pending even though
/// the store already has the head in progress
#[tokio::test]
async fn test_submission_returns_pre_dispatch_snapshot() {
    let harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(sequential_spec("etl", &["extract", "load"]))
        .await
        .unwrap();

    for task in &accepted.tasks {
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.version, 1);
    }

    let stored_head = harness.store.fetch(&accepted.tasks[0].id).await.unwrap();
    assert_eq!(stored_head.status, TaskStatus::InProgress);
    assert_eq!(stored_head.version, 2);
}
