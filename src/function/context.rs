//! Execution context handed to functions

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::cluster::ClusterClient;
use crate::config::RunnerConfig;

/// Per-invocation collaborators: cluster access, cancellation, settings
#[derive(Clone)]
pub struct ExecutionContext {
    cluster: Arc<dyn ClusterClient>,
    cancellation: CancellationToken,
    config: Arc<RunnerConfig>,
}

impl ExecutionContext {
    /// Creates a context with default settings and a fresh token
    pub fn new(cluster: Arc<dyn ClusterClient>) -> Self {
        Self {
            cluster,
            cancellation: CancellationToken::new(),
            config: Arc::new(RunnerConfig::default()),
        }
    }

    /// Sets the token that cancels the wait step
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn cluster(&self) -> &Arc<dyn ClusterClient> {
        &self.cluster
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }
}
