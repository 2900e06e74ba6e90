//! [`ClusterClient`] backed by the `kubectl` binary

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use super::manifest::job_manifest;
use super::{ClusterClient, ClusterError, JobHandle, JobSpec, JobStatus};
use crate::subprocess::{ProcessCommandBuilder, ProcessOutput, ProcessRunner};

pub struct KubectlClient {
    runner: Arc<dyn ProcessRunner>,
    program: String,
    poll_interval: Duration,
    call_timeout: Duration,
}

impl KubectlClient {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            program: "kubectl".to_string(),
            poll_interval: Duration::from_secs(2),
            call_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    async fn kubectl(
        &self,
        args: &[&str],
        stdin: Option<String>,
    ) -> Result<ProcessOutput, ClusterError> {
        let mut builder = ProcessCommandBuilder::new(&self.program)
            .args(args)
            .timeout(self.call_timeout);
        if let Some(input) = stdin {
            builder = builder.stdin(input);
        }
        let command = builder.build();
        trace!("Running {}", command.display());
        Ok(self.runner.run(command).await?)
    }
}

fn is_not_found(output: &ProcessOutput) -> bool {
    output.stderr.contains("NotFound") || output.stderr.contains("not found")
}

fn failure_message(output: &ProcessOutput) -> String {
    let stderr = output.stderr.trim();
    if stderr.is_empty() {
        format!("kubectl exited with {:?}", output.status)
    } else {
        stderr.to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobObject {
    status: JobObjectStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobObjectStatus {
    succeeded: u32,
    failed: u32,
    conditions: Vec<JobCondition>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JobCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
    reason: String,
    message: String,
}

impl JobObjectStatus {
    /// `None` while the job is still running
    fn terminal(&self) -> Option<JobStatus> {
        let failed_condition = self
            .conditions
            .iter()
            .find(|c| c.kind == "Failed" && c.status == "True");

        if let Some(condition) = failed_condition {
            let reason = match (condition.reason.is_empty(), condition.message.is_empty()) {
                (false, false) => format!("{}: {}", condition.reason, condition.message),
                (false, true) => condition.reason.clone(),
                (true, false) => condition.message.clone(),
                (true, true) => "job failed".to_string(),
            };
            return Some(JobStatus::Failed { reason });
        }
        if self.succeeded > 0 {
            return Some(JobStatus::Succeeded);
        }
        if self.failed > 0 {
            return Some(JobStatus::Failed {
                reason: format!("{} pod(s) failed", self.failed),
            });
        }
        None
    }
}

#[async_trait]
impl ClusterClient for KubectlClient {
    async fn volume_claim_exists(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<bool, ClusterError> {
        let output = self
            .kubectl(&["get", "pvc", name, "-n", namespace, "-o", "name"], None)
            .await?;

        if output.status.success() {
            Ok(true)
        } else if is_not_found(&output) {
            Ok(false)
        } else {
            Err(ClusterError::api(
                "get persistentvolumeclaim",
                failure_message(&output),
            ))
        }
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<JobHandle, ClusterError> {
        let manifest =
            serde_json::to_string(&job_manifest(spec)).map_err(ClusterError::Encode)?;
        let output = self
            .kubectl(&["create", "-f", "-", "-o", "name"], Some(manifest))
            .await?;

        if !output.status.success() {
            return Err(ClusterError::api("create job", failure_message(&output)));
        }
        debug!("Created {}", output.stdout.trim());
        Ok(JobHandle::from(spec))
    }

    async fn wait_for_completion(&self, job: &JobHandle) -> Result<JobStatus, ClusterError> {
        loop {
            let output = self
                .kubectl(
                    &["get", "job", &job.name, "-n", &job.namespace, "-o", "json"],
                    None,
                )
                .await?;

            if !output.status.success() {
                return Err(ClusterError::api("get job", failure_message(&output)));
            }

            let object: JobObject =
                serde_json::from_str(&output.stdout).map_err(|source| ClusterError::Decode {
                    what: format!("job {job}"),
                    source,
                })?;

            if let Some(status) = object.status.terminal() {
                return Ok(status);
            }

            trace!("Job {} still running", job);
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn delete_job(&self, job: &JobHandle) -> Result<(), ClusterError> {
        let output = self
            .kubectl(
                &[
                    "delete",
                    "job",
                    &job.name,
                    "-n",
                    &job.namespace,
                    "--ignore-not-found",
                    "--wait=false",
                    "--cascade=background",
                ],
                None,
            )
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ClusterError::api("delete job", failure_message(&output)))
        }
    }
}
