//! Ephemeral job execution engine
//!
//! [`run_job`] drives one disposable job through its whole lifecycle:
//! validate the requested claims, create the job under a fresh name, wait for
//! a terminal status while honouring cancellation, then delete it. Deletion
//! happens on every exit path once the job exists, and its failure never
//! replaces the result of the run.

pub mod guard;
pub mod name;

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::cluster::{JobSpec, JobStatus};
use crate::error::FunctionError;
use crate::function::ExecutionContext;
use crate::param::VolumeMounts;

pub use guard::JobGuard;
pub use name::generate_job_name;

pub const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
pub const MANAGED_BY_VALUE: &str = "datamover";

/// What a function asks the engine to run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRequest {
    pub namespace: String,
    pub image: String,
    pub service_account: Option<String>,
    pub command: Vec<String>,
    pub volumes: VolumeMounts,
    pub labels: BTreeMap<String, String>,
}

impl JobRequest {
    pub fn new(namespace: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            image: image.into(),
            ..Self::default()
        }
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn volumes(mut self, volumes: VolumeMounts) -> Self {
        self.volumes = volumes;
        self
    }

    /// Empty names are treated as no service account
    pub fn service_account(mut self, service_account: Option<String>) -> Self {
        self.service_account = service_account.filter(|sa| !sa.is_empty());
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    fn into_spec(self, name: String) -> JobSpec {
        let mut labels = self.labels;
        labels.insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());
        JobSpec {
            name,
            namespace: self.namespace,
            image: self.image,
            service_account: self.service_account,
            command: self.command,
            volumes: self.volumes,
            labels,
        }
    }
}

/// Checks that every claim in `volumes` exists in `namespace`, in key order
async fn validate_claims(
    ctx: &ExecutionContext,
    namespace: &str,
    volumes: &VolumeMounts,
) -> Result<(), FunctionError> {
    for claim in volumes.keys() {
        let exists = ctx
            .cluster()
            .volume_claim_exists(namespace, claim)
            .await
            .map_err(|source| FunctionError::VolumeLookup {
                namespace: namespace.to_string(),
                claim: claim.clone(),
                source,
            })?;
        if !exists {
            return Err(FunctionError::VolumeNotFound {
                namespace: namespace.to_string(),
                claim: claim.clone(),
            });
        }
    }
    Ok(())
}

/// Runs `request` as a single job and waits for it.
///
/// Returns `Cancelled` as soon as the context's token fires. A token that has
/// already fired stops the run before the job is created; otherwise the job
/// is still deleted before returning.
#[tracing::instrument(skip_all, fields(namespace = %request.namespace, image = %request.image))]
pub async fn run_job(ctx: &ExecutionContext, request: JobRequest) -> Result<(), FunctionError> {
    validate_claims(ctx, &request.namespace, &request.volumes).await?;

    let name = generate_job_name(&ctx.config().job_name_prefix);
    let spec = request.into_spec(name);

    if ctx.cancellation().is_cancelled() {
        info!("Cancelled before creating job {}", spec.name);
        return Err(FunctionError::Cancelled { job: spec.name });
    }

    let handle = ctx
        .cluster()
        .create_job(&spec)
        .await
        .map_err(|source| FunctionError::CreationFailed {
            job: spec.name.clone(),
            source,
        })?;
    info!("Created job {}", handle);

    let guard = JobGuard::new(ctx.cluster().clone(), handle);
    let job = guard.handle().name.clone();

    let result = tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => {
            info!("Cancelled while waiting for job {}", guard.handle());
            Err(FunctionError::Cancelled { job })
        }
        status = ctx.cluster().wait_for_completion(guard.handle()) => match status {
            Ok(JobStatus::Succeeded) => {
                info!("Job {} completed", guard.handle());
                Ok(())
            }
            Ok(JobStatus::Failed { reason }) => Err(FunctionError::ExecutionFailed { job, reason }),
            Err(source) => Err(FunctionError::WaitFailed { job, source }),
        },
    };

    debug!("Releasing job {}", guard.handle());
    guard.release().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{JobOutcome, MockClusterClient};
    use crate::config::RunnerConfig;
    use std::sync::Arc;

    fn context(mock: &MockClusterClient) -> ExecutionContext {
        ExecutionContext::new(Arc::new(mock.clone()))
    }

    fn request(volumes: &[(&str, &str)]) -> JobRequest {
        JobRequest::new("apps", "busybox")
            .command(vec!["true".to_string()])
            .volumes(
                volumes
                    .iter()
                    .map(|(c, p)| (c.to_string(), p.to_string()))
                    .collect(),
            )
    }

    #[tokio::test]
    async fn test_claims_checked_in_key_order() {
        let mock = MockClusterClient::new().with_volume_claim("apps", "a-data");
        let ctx = context(&mock);

        let err = run_job(&ctx, request(&[("z-logs", "/logs"), ("a-data", "/data"), ("m-missing", "/m")]))
            .await
            .unwrap_err();

        assert!(matches!(err, FunctionError::VolumeNotFound { claim, .. } if claim == "m-missing"));
        assert_eq!(mock.lookup_calls(), 2);
        assert_eq!(mock.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_lookup_error_is_distinct_from_missing() {
        let mock = MockClusterClient::new().failing_lookup("connection refused");
        let ctx = context(&mock);

        let err = run_job(&ctx, request(&[("data", "/data")])).await.unwrap_err();

        assert!(matches!(err, FunctionError::VolumeLookup { .. }));
        assert_eq!(mock.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_job_uses_configured_prefix_and_label() {
        let mock = MockClusterClient::new();
        let config = RunnerConfig {
            job_name_prefix: "seed-".to_string(),
            ..RunnerConfig::default()
        };
        let ctx = context(&mock).with_config(config);

        run_job(&ctx, request(&[])).await.unwrap();

        let created = &mock.created_jobs()[0];
        assert!(created.name.starts_with("seed-"));
        assert_eq!(created.name.len(), "seed-".len() + 5);
        assert_eq!(
            created.labels.get(MANAGED_BY_LABEL).map(String::as_str),
            Some(MANAGED_BY_VALUE)
        );
        assert_eq!(mock.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_wait_error_still_deletes() {
        let mock = MockClusterClient::new().with_outcome(JobOutcome::WaitError("timeout".into()));
        let ctx = context(&mock);

        let err = run_job(&ctx, request(&[])).await.unwrap_err();

        assert!(matches!(err, FunctionError::WaitFailed { .. }));
        assert_eq!(mock.delete_calls(), 1);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_skips_creation() {
        let mock = MockClusterClient::new()
            .with_volume_claim("apps", "data")
            .with_outcome(JobOutcome::Hang);
        let ctx = context(&mock);
        ctx.cancellation().cancel();

        let err = run_job(&ctx, request(&[("data", "/data")])).await.unwrap_err();

        assert!(matches!(err, FunctionError::Cancelled { .. }));
        assert_eq!(mock.lookup_calls(), 1);
        assert_eq!(mock.create_calls(), 0);
        assert_eq!(mock.delete_calls(), 0);
    }

    #[test]
    fn test_empty_service_account_is_none() {
        let req = JobRequest::new("ns", "img").service_account(Some(String::new()));
        assert_eq!(req.service_account, None);
    }
}
