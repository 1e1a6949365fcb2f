//! Conversational job setup.
//!
//! Each user owns at most one [`Session`]. Every text message advances it by
//! exactly one [`Step`]; the final step hands a complete [`JobParams`] back to
//! the caller and drops the session.

mod prompts;

pub use prompts::conversation_error;

use crate::channel::CaptionEdit;
use crate::error::WizardError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Input meaning "no limit" at the limit step and "delete" at the replace step.
pub const SENTINEL: &str = "-";

/// Platform user identifier.
pub type UserId = i64;

/// How collected messages are relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMode {
    /// Forward messages unchanged
    Simple,
    /// Rewrite matching captions while relaying
    Edit,
}

impl ForwardMode {
    /// Mode implied by an optional caption rewrite.
    #[must_use]
    pub const fn of(caption_edit: Option<&CaptionEdit>) -> Self {
        match caption_edit {
            Some(_) => Self::Edit,
            None => Self::Simple,
        }
    }
}

/// Position of a session in the setup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    /// Waiting for the source channel
    AwaitingSource,
    /// Waiting for the destination channel
    AwaitingDestination,
    /// Waiting for the caption text to find (edit mode only)
    AwaitingFindText,
    /// Waiting for the replacement text (edit mode only)
    AwaitingReplaceText,
    /// Waiting for the message limit
    AwaitingLimit,
}

/// A user's in-progress setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Relay mode chosen by the opening command
    pub mode: ForwardMode,
    /// Current step
    pub step: Step,
    /// Chat the setup runs in; replies and job status go here
    pub origin_chat: i64,
    /// Raw source channel reference
    pub source: Option<String>,
    /// Destination channel reference, stored verbatim
    pub destination: Option<String>,
    /// Caption text to find
    pub find_text: Option<String>,
    /// Replacement text, empty for deletion
    pub replace_text: Option<String>,
}

impl Session {
    /// Fresh session at the first step.
    #[must_use]
    pub const fn new(mode: ForwardMode, origin_chat: i64) -> Self {
        Self {
            mode,
            step: Step::AwaitingSource,
            origin_chat,
            source: None,
            destination: None,
            find_text: None,
            replace_text: None,
        }
    }

    fn into_params(self, limit: Option<usize>) -> Result<JobParams, WizardError> {
        let caption_edit = match self.mode {
            ForwardMode::Simple => None,
            ForwardMode::Edit => Some(CaptionEdit {
                find_text: self.find_text.ok_or(WizardError::MissingField("find_text"))?,
                replace_text: self
                    .replace_text
                    .ok_or(WizardError::MissingField("replace_text"))?,
            }),
        };
        Ok(JobParams {
            origin_chat: self.origin_chat,
            source: self.source.ok_or(WizardError::MissingField("source"))?,
            destination: self
                .destination
                .ok_or(WizardError::MissingField("destination"))?,
            caption_edit,
            limit,
        })
    }
}

/// Everything a forwarding job needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobParams {
    /// Chat that receives status messages
    pub origin_chat: i64,
    /// Source channel reference as typed by the user
    pub source: String,
    /// Destination channel reference as typed by the user
    pub destination: String,
    /// Caption rewrite, present in edit mode only
    pub caption_edit: Option<CaptionEdit>,
    /// Upper bound on messages to read; `None` reads the whole history
    pub limit: Option<usize>,
}

impl JobParams {
    /// Relay mode implied by the parameters.
    #[must_use]
    pub const fn mode(&self) -> ForwardMode {
        ForwardMode::of(self.caption_edit.as_ref())
    }
}

/// Result of feeding one text message to the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    /// The session advanced; send the next prompt
    Prompt(String),
    /// Input rejected; the session stays at the same step
    Retry(String),
    /// The session failed and was dropped
    Error(String),
    /// All fields collected; the session was dropped
    Complete(JobParams),
}

/// Rejected limit input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLimit;

/// Parse the limit step input.
///
/// [`SENTINEL`] means unbounded; otherwise the input must be a positive
/// decimal integer.
///
/// # Errors
///
/// Returns [`InvalidLimit`] for zero, signs, and anything non-numeric.
pub fn parse_limit(input: &str) -> Result<Option<usize>, InvalidLimit> {
    let input = input.trim();
    if input == SENTINEL {
        return Ok(None);
    }
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidLimit);
    }
    match input.parse::<usize>() {
        Ok(0) | Err(_) => Err(InvalidLimit),
        Ok(limit) => Ok(Some(limit)),
    }
}

enum StepResult {
    Advanced(String),
    Rejected(String),
    Finished(Option<usize>),
}

fn apply_step(session: &mut Session, raw: &str) -> StepResult {
    let text = raw.trim();
    match session.step {
        Step::AwaitingSource => {
            session.source = Some(text.to_string());
            session.step = Step::AwaitingDestination;
            StepResult::Advanced(prompts::destination_prompt())
        }
        Step::AwaitingDestination => {
            session.destination = Some(text.to_string());
            match session.mode {
                ForwardMode::Edit => {
                    session.step = Step::AwaitingFindText;
                    StepResult::Advanced(prompts::find_text_prompt())
                }
                ForwardMode::Simple => {
                    session.step = Step::AwaitingLimit;
                    StepResult::Advanced(prompts::limit_prompt(3, None))
                }
            }
        }
        Step::AwaitingFindText => {
            if text.is_empty() {
                return StepResult::Rejected(prompts::empty_find_text());
            }
            session.find_text = Some(text.to_string());
            session.step = Step::AwaitingReplaceText;
            StepResult::Advanced(prompts::replace_text_prompt())
        }
        Step::AwaitingReplaceText => {
            let replace_text = if raw == SENTINEL { "" } else { raw };
            session.replace_text = Some(replace_text.to_string());
            session.step = Step::AwaitingLimit;
            StepResult::Advanced(prompts::limit_prompt(5, Some(replace_text)))
        }
        Step::AwaitingLimit => match parse_limit(text) {
            Ok(limit) => StepResult::Finished(limit),
            Err(InvalidLimit) => StepResult::Rejected(prompts::invalid_limit()),
        },
    }
}

/// Process-wide map of open sessions, keyed by user.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl SessionStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no sessions are open
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Snapshot of a user's session.
    ///
    /// Read-only inspection; the wizard itself mutates sessions under a
    /// single write lock in [`SetupWizard::advance`].
    pub async fn get(&self, user_id: UserId) -> Option<Session> {
        self.sessions.read().await.get(&user_id).cloned()
    }

    /// Drop a user's session, returning it if one was open
    pub async fn remove(&self, user_id: UserId) -> Option<Session> {
        self.sessions.write().await.remove(&user_id)
    }
}

/// Owns the session store and drives sessions through their steps.
#[derive(Debug, Default)]
pub struct SetupWizard {
    store: SessionStore,
}

impl SetupWizard {
    /// Create a wizard with no open sessions
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the underlying store
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Open a session for `user_id`, replacing any previous one.
    ///
    /// Returns the first prompt to send.
    pub async fn open(&self, user_id: UserId, mode: ForwardMode, origin_chat: i64) -> String {
        let replaced = self
            .store
            .sessions
            .write()
            .await
            .insert(user_id, Session::new(mode, origin_chat));
        if replaced.is_some() {
            debug!(user_id, "Replaced an open setup session");
        }
        info!(user_id, ?mode, "Setup session opened");
        prompts::source_prompt(mode)
    }

    /// Feed one text message to `user_id`'s session.
    ///
    /// Returns `None` when the user has no open session.
    pub async fn advance(&self, user_id: UserId, text: &str) -> Option<WizardOutcome> {
        let mut sessions = self.store.sessions.write().await;
        let session = sessions.get_mut(&user_id)?;

        let outcome = match apply_step(session, text) {
            StepResult::Advanced(prompt) => {
                debug!(user_id, step = ?session.step, "Setup session advanced");
                WizardOutcome::Prompt(prompt)
            }
            StepResult::Rejected(prompt) => {
                debug!(user_id, step = ?session.step, "Setup input rejected");
                WizardOutcome::Retry(prompt)
            }
            StepResult::Finished(limit) => {
                let session = sessions.remove(&user_id)?;
                match session.into_params(limit) {
                    Ok(params) => {
                        info!(user_id, source = %params.source, destination = %params.destination, ?limit, "Setup complete");
                        WizardOutcome::Complete(params)
                    }
                    Err(e) => {
                        warn!(user_id, error = %e, "Setup session dropped");
                        WizardOutcome::Error(prompts::conversation_error(&e.to_string()))
                    }
                }
            }
        };
        Some(outcome)
    }

    /// Drop `user_id`'s session after a failure outside the wizard.
    pub async fn abort(&self, user_id: UserId) -> bool {
        self.store.remove(user_id).await.is_some()
    }
}
