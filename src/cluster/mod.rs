//! Cluster resource client contract
//!
//! The execution engine only needs four primitives from the cluster: check a
//! volume claim, create a job, wait for it, delete it. [`ClusterClient`]
//! captures exactly those so the engine can run against `kubectl`
//! ([`KubectlClient`]) or an in-memory double ([`MockClusterClient`]).

pub mod kubectl;
pub mod manifest;
pub mod mock;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

use crate::param::VolumeMounts;
use crate::subprocess::ProcessError;

pub use kubectl::KubectlClient;
pub use mock::{JobOutcome, MockClusterClient};

#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("{operation} rejected by the cluster: {message}")]
    Api { operation: String, message: String },

    #[error("failed to run cluster command")]
    Process(#[from] ProcessError),

    #[error("failed to decode {what}")]
    Decode {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode job manifest")]
    Encode(#[source] serde_json::Error),
}

impl ClusterError {
    pub fn api(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Everything needed to submit one disposable job
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub service_account: Option<String>,
    pub command: Vec<String>,
    pub volumes: VolumeMounts,
    pub labels: BTreeMap<String, String>,
}

/// Identifies a job that exists in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub name: String,
    pub namespace: String,
}

impl JobHandle {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl From<&JobSpec> for JobHandle {
    fn from(spec: &JobSpec) -> Self {
        Self::new(&spec.name, &spec.namespace)
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Terminal state of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Succeeded,
    Failed { reason: String },
}

#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Whether the persistent volume claim exists in `namespace`
    async fn volume_claim_exists(&self, namespace: &str, name: &str)
        -> Result<bool, ClusterError>;

    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError>;

    /// Resolves once the job reaches a terminal state.
    ///
    /// Dropping the returned future stops the wait; the job itself keeps
    /// running in the cluster.
    async fn wait_for_completion(&self, job: &JobHandle) -> Result<JobStatus, ClusterError>;

    async fn delete_job(&self, job: &JobHandle) -> Result<(), ClusterError>;
}
