//! Error types for platform calls, the setup wizard and forwarding jobs.

use thiserror::Error;

/// Errors reported by the messaging platform client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The platform rejected the request
    #[error("API error: {0}")]
    Api(String),
    /// Transport-level failure talking to the platform
    #[error("Network error: {0}")]
    Network(String),
    /// A channel or message could not be resolved
    #[error("Not found: {0}")]
    NotFound(String),
    /// Anything the adapter could not classify
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors raised while assembling job parameters from a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// A field required by the session mode was never collected
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

/// Job-level failures that end a forwarding run early.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Opening or reading the source history failed
    #[error("history unavailable: {0}")]
    History(PlatformError),
    /// The initial status message could not be posted
    #[error("status message failed: {0}")]
    Status(PlatformError),
}

/// Returned when a job is requested while another one is active.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("another forwarding job is already running")]
pub struct JobConflict;
