//! Forwarding jobs.
//!
//! A [`JobSupervisor`] owns the single job slot and spawns a
//! [`ForwardExecutor`] run per accepted [`JobParams`].

mod executor;
pub mod render;
mod supervisor;

pub use executor::ForwardExecutor;
pub use supervisor::{JobHandle, JobSupervisor, StopOutcome, SupervisorStatus};

use crate::channel::{normalize_source, CaptionEdit};
use crate::config::{PROGRESS_EVERY, RELAY_DELAY_MS};
use crate::error::JobError;
use crate::wizard::{ForwardMode, JobParams};
use std::fmt;
use std::time::Duration;

/// Identifier assigned to each accepted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Executor pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Sleep after every processed message
    pub relay_delay: Duration,
    /// Edit the status message every this many processed messages
    pub progress_every: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            relay_delay: Duration::from_millis(RELAY_DELAY_MS),
            progress_every: PROGRESS_EVERY,
        }
    }
}

/// A job as the executor sees it: parameters with the source normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job identifier
    pub id: JobId,
    /// Normalized source channel username
    pub source: String,
    /// Destination reference, passed through unmodified
    pub destination: String,
    /// Caption rewrite for edit mode
    pub caption_edit: Option<CaptionEdit>,
    /// Read bound; `None` reads to exhaustion
    pub limit: Option<usize>,
}

impl Job {
    /// Build a job from wizard output.
    #[must_use]
    pub fn from_params(id: JobId, params: &JobParams) -> Self {
        Self {
            id,
            source: normalize_source(&params.source),
            destination: params.destination.clone(),
            caption_edit: params.caption_edit.clone(),
            limit: params.limit,
        }
    }

    /// Relay mode of this job.
    #[must_use]
    pub const fn mode(&self) -> ForwardMode {
        ForwardMode::of(self.caption_edit.as_ref())
    }
}

/// Running totals of a job.
///
/// `edited + failed <= forwarded` holds at every point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobCounters {
    /// Messages processed, including ones skipped after a relay failure
    pub forwarded: usize,
    /// Messages copied with a rewritten caption
    pub edited: usize,
    /// Messages skipped because the platform rejected them
    pub failed: usize,
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// History ran out or the limit was reached
    Exhausted,
    /// A stop was requested
    Stopped,
    /// The job could not continue
    Failed(JobError),
}

/// Final state of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Job identifier
    pub id: JobId,
    /// Totals at exit
    pub counters: JobCounters,
    /// Exit reason
    pub outcome: JobOutcome,
}
