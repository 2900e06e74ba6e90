//! Error taxonomy for function invocations
//!
//! Every variant names the identifier an operator needs to act on the failure
//! (argument key, pod, claim, job or function name). Nothing here is retried.

use std::fmt;
use thiserror::Error;

use crate::cluster::ClusterError;

/// Which way the `pod` / `volumes` pair of a restore was mis-specified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeSourceConflict {
    /// Neither a pod nor any volumes were supplied
    Neither,
    /// Both a pod and a non-empty volume map were supplied
    Both,
}

impl fmt::Display for VolumeSourceConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeSourceConflict::Neither => write!(f, "no volume source given"),
            VolumeSourceConflict::Both => write!(f, "both pod and volumes given"),
        }
    }
}

#[derive(Error, Debug)]
pub enum FunctionError {
    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    #[error("argument '{name}' is {found}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("template params carry no workload topology")]
    InvalidTopology,

    #[error("failed to find volumes for pod '{pod}'")]
    PodVolumesNotFound { pod: String },

    #[error("{conflict}: require exactly one of 'pod' or 'volumes'")]
    AmbiguousVolumeSource { conflict: VolumeSourceConflict },

    #[error("template params carry no location profile")]
    MissingProfile,

    #[error("invalid location profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("failed to serialize location profile")]
    ProfileSerialization(#[source] serde_json::Error),

    #[error("persistent volume claim '{claim}' not found in namespace '{namespace}'")]
    VolumeNotFound { namespace: String, claim: String },

    #[error("failed to retrieve persistent volume claim '{claim}' in namespace '{namespace}'")]
    VolumeLookup {
        namespace: String,
        claim: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed to create job '{job}'")]
    CreationFailed {
        job: String,
        #[source]
        source: ClusterError,
    },

    #[error("failed while waiting for job '{job}' to complete")]
    WaitFailed {
        job: String,
        #[source]
        source: ClusterError,
    },

    #[error("job '{job}' failed: {reason}")]
    ExecutionFailed { job: String, reason: String },

    #[error("job '{job}' was cancelled")]
    Cancelled { job: String },

    #[error("failed to delete job '{job}'")]
    DeletionFailed {
        job: String,
        #[source]
        source: ClusterError,
    },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function '{name}' is already registered")]
    DuplicateFunction { name: String },

    #[error("function {function} failed")]
    Invocation {
        function: String,
        #[source]
        source: Box<FunctionError>,
    },
}

impl FunctionError {
    pub fn missing_argument(name: impl Into<String>) -> Self {
        Self::MissingArgument { name: name.into() }
    }

    pub fn pod_volumes_not_found(pod: impl Into<String>) -> Self {
        Self::PodVolumesNotFound { pod: pod.into() }
    }

    pub fn invalid_profile(reason: impl Into<String>) -> Self {
        Self::InvalidProfile {
            reason: reason.into(),
        }
    }

    /// Wraps the error with the name of the function that produced it
    pub fn in_function(self, function: impl Into<String>) -> Self {
        Self::Invocation {
            function: function.into(),
            source: Box::new(self),
        }
    }

    /// Strips any `Invocation` layers
    pub fn root(&self) -> &FunctionError {
        match self {
            FunctionError::Invocation { source, .. } => source.root(),
            other => other,
        }
    }

    /// Name of the job the error refers to, if any
    pub fn job_name(&self) -> Option<&str> {
        match self.root() {
            FunctionError::CreationFailed { job, .. }
            | FunctionError::WaitFailed { job, .. }
            | FunctionError::ExecutionFailed { job, .. }
            | FunctionError::Cancelled { job }
            | FunctionError::DeletionFailed { job, .. } => Some(job),
            _ => None,
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self.root() {
            FunctionError::MissingArgument { .. }
            | FunctionError::TypeMismatch { .. }
            | FunctionError::InvalidTopology
            | FunctionError::PodVolumesNotFound { .. }
            | FunctionError::AmbiguousVolumeSource { .. }
            | FunctionError::MissingProfile
            | FunctionError::InvalidProfile { .. }
            | FunctionError::ProfileSerialization(_)
            | FunctionError::UnknownFunction { .. }
            | FunctionError::DuplicateFunction { .. } => 2,
            FunctionError::VolumeNotFound { .. }
            | FunctionError::VolumeLookup { .. }
            | FunctionError::CreationFailed { .. }
            | FunctionError::WaitFailed { .. }
            | FunctionError::DeletionFailed { .. } => 3,
            FunctionError::ExecutionFailed { .. } => 4,
            FunctionError::Cancelled { .. } => 130,
            FunctionError::Invocation { .. } => 1,
        }
    }
}
