//! Create / wait / delete guarantees of the execution engine

mod common;

use std::time::Duration;

use common::{context, mounts, wait_for_deletes};
use datamover::cluster::{JobOutcome, MockClusterClient};
use datamover::job::{run_job, JobRequest};
use datamover::FunctionError;
use tokio_util::sync::CancellationToken;

fn request() -> JobRequest {
    JobRequest::new("apps", "busybox")
        .command(vec!["sleep".to_string(), "3600".to_string()])
        .volumes(mounts(&[("pvc1", "/data")]))
}

fn cluster(outcome: JobOutcome) -> MockClusterClient {
    MockClusterClient::new()
        .with_volume_claim("apps", "pvc1")
        .with_outcome(outcome)
}

#[tokio::test]
async fn test_deleted_once_on_success() {
    let mock = cluster(JobOutcome::Succeed);

    run_job(&context(&mock), request()).await.unwrap();

    assert_eq!(mock.create_calls(), 1);
    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_deleted_once_on_failure() {
    let mock = cluster(JobOutcome::Fail("DeadlineExceeded".to_string()));

    let err = run_job(&context(&mock), request()).await.unwrap_err();

    assert!(matches!(err, FunctionError::ExecutionFailed { .. }));
    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_cancel_mid_wait_returns_promptly_and_deletes_once() {
    let mock = cluster(JobOutcome::Hang);
    let token = CancellationToken::new();
    let ctx = context(&mock).with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), run_job(&ctx, request()))
        .await
        .expect("cancellation should end the wait");
    canceller.await.unwrap();

    let err = result.unwrap_err();
    let created = mock.created_jobs();
    assert!(matches!(&err, FunctionError::Cancelled { job } if *job == created[0].name));
    assert_eq!(err.exit_code(), 130);
    assert_eq!(mock.wait_calls(), 1);

    // Give a stray Drop-scheduled deletion the chance to show up
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_deletion_failure_does_not_mask_success() {
    let mock = cluster(JobOutcome::Succeed).failing_deletion("forbidden");

    run_job(&context(&mock), request()).await.unwrap();

    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_deletion_failure_does_not_mask_execution_failure() {
    let mock = cluster(JobOutcome::Fail("Error".to_string())).failing_deletion("forbidden");

    let err = run_job(&context(&mock), request()).await.unwrap_err();

    assert!(matches!(err, FunctionError::ExecutionFailed { .. }));
    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_aborted_invocation_still_deletes() {
    let mock = cluster(JobOutcome::Hang);
    let ctx = context(&mock);

    let task = tokio::spawn(async move { run_job(&ctx, request()).await });

    for _ in 0..200 {
        if mock.wait_calls() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(mock.wait_calls(), 1);

    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    wait_for_deletes(&mock, 1).await;
    assert_eq!(mock.delete_calls(), 1);
}

#[tokio::test]
async fn test_concurrent_invocations_use_distinct_jobs() {
    let mock = cluster(JobOutcome::Succeed);
    let mut set = tokio::task::JoinSet::new();

    for _ in 0..8 {
        let ctx = context(&mock);
        set.spawn(async move { run_job(&ctx, request()).await });
    }
    while let Some(result) = set.join_next().await {
        result.unwrap().unwrap();
    }

    let mut names: Vec<String> = mock.created_jobs().into_iter().map(|j| j.name).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 8);
    assert_eq!(mock.delete_calls(), 8);
}
