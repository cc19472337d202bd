//! Parallel workflow integration tests.

use std::collections::HashSet;

use conductor::channel::CompletionEvent;
use conductor::core::{TaskId, TaskStatus, WorkflowStatus};
use conductor::orchestration::ReconcileOutcome;

use crate::fixtures::{parallel_spec, EngineHarness, LivePipeline};

/// Test: Parallel Fan-Out At Submission
///
/// Given a three-task parallel workflow
/// When the workflow is submitted
/// Then every task dispatches immediately and runs at once
#[tokio::test]
async fn test_parallel_fan_out_at_submission() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(parallel_spec("fanout", &["resize", "watermark", "thumbnail"]))
        .await
        .unwrap();

    let delivered: HashSet<TaskId> = harness
        .expect_deliveries(3)
        .await
        .into_iter()
        .map(|t| t.id)
        .collect();
    let expected: HashSet<TaskId> = accepted.tasks.iter().map(|t| t.id).collect();
    assert_eq!(delivered, expected, "every task dispatches at submission");

    let current = harness.engine.workflow(&accepted.id).await.unwrap();
    for task in &current.tasks {
        assert_eq!(task.status, TaskStatus::InProgress);
    }
    assert_eq!(current.status(), WorkflowStatus::Running);
}

/// Test: Mixed Outcomes Settle Failed
///
/// Given a two-task parallel workflow in flight
/// When one task fails and the other succeeds
/// Then the workflow settles with a failed status and no extra dispatches
#[tokio::test]
async fn test_mixed_outcomes_settle_failed() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(parallel_spec("fanout", &["resize", "watermark"]))
        .await
        .unwrap();
    let delivered = harness.expect_deliveries(2).await;

    let outcome = harness
        .engine
        .handle_completion(CompletionEvent::failure(delivered[0].id))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::TaskFailed {
            task_id: delivered[0].id,
        }
    );

    let outcome = harness
        .engine
        .handle_completion(CompletionEvent::success(delivered[1].id))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ReconcileOutcome::TaskCompleted {
            task_id: delivered[1].id,
            continued: false,
        },
        "parallel mode never chains a successor"
    );

    let settled = harness.engine.workflow(&accepted.id).await.unwrap();
    assert!(settled.is_settled());
    assert_eq!(settled.status(), WorkflowStatus::Failed);
    assert_eq!(
        harness.channel.publish_count().await,
        2,
        "completions must not trigger further dispatches"
    );
}

/// Test: Completion Order Independence
///
/// Given a three-task parallel workflow in flight
/// When completions arrive in reverse dispatch order
/// Then every task ends completed and the workflow settles
#[tokio::test]
async fn test_completions_reconcile_in_any_order() {
    let mut harness = EngineHarness::new();

    let accepted = harness
        .engine
        .submit(parallel_spec("fanout", &["a", "b", "c"]))
        .await
        .unwrap();
    let delivered = harness.expect_deliveries(3).await;

    for task in delivered.iter().rev() {
        harness
            .engine
            .handle_completion(CompletionEvent::success(task.id))
            .await
            .unwrap();
    }

    let settled = harness.engine.workflow(&accepted.id).await.unwrap();
    assert_eq!(settled.status(), WorkflowStatus::Completed);
}

/// Test: Parallel E2E With Failing Task Type
///
/// Given a running worker configured to fail watermark tasks
/// When a three-task parallel workflow executes unattended
/// Then the failing task ends failed, the rest complete, and the
/// workflow settles failed
#[tokio::test]
async fn test_parallel_e2e_with_failing_type() {
    let pipeline = LivePipeline::start(&["watermark"]);

    let accepted = pipeline
        .engine
        .submit(parallel_spec("fanout", &["resize", "watermark", "thumbnail"]))
        .await
        .unwrap();

    let settled = pipeline.wait_until_settled(&accepted.id).await;
    assert_eq!(settled.status(), WorkflowStatus::Failed);
    for task in &settled.tasks {
        let expected = if task.task_type == "watermark" {
            TaskStatus::Failed
        } else {
            TaskStatus::Completed
        };
        assert_eq!(task.status, expected, "outcome for {}", task.task_type);
    }
}
