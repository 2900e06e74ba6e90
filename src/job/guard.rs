use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cluster::{ClusterClient, JobHandle};
use crate::error::FunctionError;

/// Owns a created job and deletes it exactly once.
///
/// Normal exits call [`JobGuard::release`]. If the owning future is dropped
/// first, `Drop` schedules the deletion on the current runtime.
pub struct JobGuard {
    client: Arc<dyn ClusterClient>,
    handle: JobHandle,
    released: Arc<AtomicBool>,
}

impl JobGuard {
    pub fn new(client: Arc<dyn ClusterClient>, handle: JobHandle) -> Self {
        Self {
            client,
            handle,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> &JobHandle {
        &self.handle
    }

    /// Deletes the job. Failures are logged, never returned.
    ///
    /// The guard only counts as released once the delete call returns, so
    /// dropping this future mid-delete still leaves `Drop` to retry it.
    pub async fn release(self) {
        if !self.released.load(Ordering::SeqCst) {
            delete_best_effort(self.client.as_ref(), &self.handle).await;
            self.released.store(true, Ordering::SeqCst);
        }
    }
}

async fn delete_best_effort(client: &dyn ClusterClient, handle: &JobHandle) {
    match client.delete_job(handle).await {
        Ok(()) => debug!("Deleted job {}", handle),
        Err(source) => {
            let err = FunctionError::DeletionFailed {
                job: handle.name.clone(),
                source,
            };
            warn!(namespace = %handle.namespace, error = ?err, "{}", err);
        }
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        if self.released.load(Ordering::SeqCst) {
            return;
        }

        let client = self.client.clone();
        let handle = self.handle.clone();
        let released = self.released.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if !released.swap(true, Ordering::SeqCst) {
                        delete_best_effort(client.as_ref(), &handle).await;
                    }
                });
            }
            Err(_) => warn!(
                "No async runtime available, job {} was not deleted",
                handle
            ),
        }
    }
}
