use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{ClusterClient, ClusterError, JobHandle, JobSpec, JobStatus};

/// How a job created on the mock behaves while being waited on
#[derive(Debug, Clone, Default)]
pub enum JobOutcome {
    #[default]
    Succeed,
    Fail(String),
    /// Never completes; only cancellation ends the wait
    Hang,
    /// The wait itself errors
    WaitError(String),
}

#[derive(Default)]
struct MockState {
    claims: BTreeSet<(String, String)>,
    outcome: JobOutcome,
    lookup_error: Option<String>,
    create_error: Option<String>,
    delete_error: Option<String>,
    delete_delay: Option<Duration>,
    lookups: Vec<(String, String)>,
    created: Vec<JobSpec>,
    waited: Vec<JobHandle>,
    deleted: Vec<JobHandle>,
}

/// In-memory cluster with scripted outcomes and call recording
#[derive(Clone, Default)]
pub struct MockClusterClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClusterClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_volume_claim(self, namespace: &str, name: &str) -> Self {
        self.state()
            .claims
            .insert((namespace.to_string(), name.to_string()));
        self
    }

    pub fn with_outcome(self, outcome: JobOutcome) -> Self {
        self.state().outcome = outcome;
        self
    }

    pub fn failing_lookup(self, message: &str) -> Self {
        self.state().lookup_error = Some(message.to_string());
        self
    }

    pub fn failing_creation(self, message: &str) -> Self {
        self.state().create_error = Some(message.to_string());
        self
    }

    pub fn failing_deletion(self, message: &str) -> Self {
        self.state().delete_error = Some(message.to_string());
        self
    }

    /// Makes every delete call sleep before it completes. The call is
    /// recorded as soon as it starts.
    pub fn with_delete_delay(self, delay: Duration) -> Self {
        self.state().delete_delay = Some(delay);
        self
    }

    pub fn lookup_calls(&self) -> usize {
        self.state().lookups.len()
    }

    pub fn create_calls(&self) -> usize {
        self.state().created.len()
    }

    pub fn wait_calls(&self) -> usize {
        self.state().waited.len()
    }

    pub fn delete_calls(&self) -> usize {
        self.state().deleted.len()
    }

    /// Total calls of every kind; zero means the cluster was never touched
    pub fn total_calls(&self) -> usize {
        let state = self.state();
        state.lookups.len() + state.created.len() + state.waited.len() + state.deleted.len()
    }

    pub fn created_jobs(&self) -> Vec<JobSpec> {
        self.state().created.clone()
    }

    pub fn deleted_jobs(&self) -> Vec<JobHandle> {
        self.state().deleted.clone()
    }
}

#[async_trait]
impl ClusterClient for MockClusterClient {
    async fn volume_claim_exists(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ClusterError> {
        let mut state = self.state();
        let key = (namespace.to_string(), name.to_string());
        state.lookups.push(key.clone());
        if let Some(message) = &state.lookup_error {
            return Err(ClusterError::api("get persistentvolumeclaim", message.clone()));
        }
        Ok(state.claims.contains(&key))
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError> {
        let mut state = self.state();
        state.created.push(spec.clone());
        if let Some(message) = &state.create_error {
            return Err(ClusterError::api("create job", message.clone()));
        }
        Ok(JobHandle::from(spec))
    }

    async fn wait_for_completion(&self, job: &JobHandle) -> Result<JobStatus, ClusterError> {
        let outcome = {
            let mut state = self.state();
            state.waited.push(job.clone());
            state.outcome.clone()
        };

        match outcome {
            JobOutcome::Succeed => Ok(JobStatus::Succeeded),
            JobOutcome::Fail(reason) => Ok(JobStatus::Failed { reason }),
            JobOutcome::Hang => std::future::pending().await,
            JobOutcome::WaitError(message) => Err(ClusterError::api("get job", message)),
        }
    }

    async fn delete_job(&self, job: &JobHandle) -> Result<(), ClusterError> {
        let (delay, error) = {
            let mut state = self.state();
            state.deleted.push(job.clone());
            (state.delete_delay, state.delete_error.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match error {
            Some(message) => Err(ClusterError::api("delete job", message)),
            None => Ok(()),
        }
    }
}
