//! Single-slot job supervisor.
//!
//! At most one job runs process-wide. The slot is taken by
//! [`JobSupervisor::try_start`] under a mutex and released by the job task
//! itself when it exits, whatever the outcome.

use super::{ExecutorConfig, ForwardExecutor, Job, JobId, JobReport};
use crate::error::JobConflict;
use crate::platform::{ChannelClient, JobTransport};
use crate::wizard::JobParams;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

struct ActiveJob {
    id: JobId,
    source: String,
    destination: String,
    cancel: CancellationToken,
}

/// Snapshot of the job slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorStatus {
    /// No job is running
    Idle,
    /// A job is relaying messages
    Running {
        /// Job identifier
        id: JobId,
        /// Normalized source
        source: String,
        /// Destination as given
        destination: String,
    },
    /// A stop was requested; the job is finishing its current message
    Stopping {
        /// Job identifier
        id: JobId,
    },
}

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The running job was told to stop
    Requested,
    /// A stop was already pending
    AlreadyStopping,
    /// Nothing was running
    Idle,
}

/// Handle to a spawned job.
#[derive(Debug)]
pub struct JobHandle {
    id: JobId,
    task: JoinHandle<Option<JobReport>>,
}

impl JobHandle {
    /// Identifier of the spawned job
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the job to finish.
    ///
    /// Returns `None` if the job task panicked.
    pub async fn wait(self) -> Option<JobReport> {
        self.task.await.ok().flatten()
    }
}

/// Sole owner of the running/idle job state.
pub struct JobSupervisor {
    active: Arc<Mutex<Option<ActiveJob>>>,
    next_id: AtomicU64,
    config: ExecutorConfig,
}

impl JobSupervisor {
    /// Create an idle supervisor whose jobs use `config`.
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Start a job unless one is already active.
    ///
    /// The check and the slot reservation happen under one lock, so two
    /// concurrent callers can never both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`JobConflict`] when a job (running or stopping) holds the slot.
    pub async fn try_start(
        &self,
        params: &JobParams,
        client: Arc<dyn ChannelClient>,
        transport: Arc<dyn JobTransport>,
    ) -> Result<JobHandle, JobConflict> {
        let mut active = self.active.lock().await;
        if let Some(current) = active.as_ref() {
            warn!(job_id = %current.id, "Rejected job start: another job is active");
            return Err(JobConflict);
        }

        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let job = Job::from_params(id, params);
        let cancel = CancellationToken::new();
        *active = Some(ActiveJob {
            id,
            source: job.source.clone(),
            destination: job.destination.clone(),
            cancel: cancel.clone(),
        });

        let executor = ForwardExecutor::new(client, transport, self.config);
        let slot = Arc::clone(&self.active);
        let task = tokio::spawn(async move {
            let run = AssertUnwindSafe(executor.run(&job, &cancel))
                .catch_unwind()
                .await;
            release(&slot, id).await;
            match run {
                Ok(report) => Some(report),
                Err(_) => {
                    error!(job_id = %id, "Forwarding task panicked");
                    None
                }
            }
        });

        info!(job_id = %id, "Job accepted");
        Ok(JobHandle { id, task })
    }

    /// Ask the running job to stop after its current message.
    pub async fn request_stop(&self) -> StopOutcome {
        let active = self.active.lock().await;
        match active.as_ref() {
            None => StopOutcome::Idle,
            Some(job) if job.cancel.is_cancelled() => StopOutcome::AlreadyStopping,
            Some(job) => {
                job.cancel.cancel();
                info!(job_id = %job.id, "Stop requested");
                StopOutcome::Requested
            }
        }
    }

    /// Whether a job currently holds the slot.
    pub async fn is_running(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Current slot state.
    pub async fn status(&self) -> SupervisorStatus {
        let active = self.active.lock().await;
        match active.as_ref() {
            None => SupervisorStatus::Idle,
            Some(job) if job.cancel.is_cancelled() => SupervisorStatus::Stopping { id: job.id },
            Some(job) => SupervisorStatus::Running {
                id: job.id,
                source: job.source.clone(),
                destination: job.destination.clone(),
            },
        }
    }
}

async fn release(slot: &Mutex<Option<ActiveJob>>, id: JobId) {
    let mut active = slot.lock().await;
    if active.as_ref().is_some_and(|job| job.id == id) {
        *active = None;
    }
}
