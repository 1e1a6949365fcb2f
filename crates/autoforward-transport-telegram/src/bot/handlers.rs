use super::job_transport::TelegramJobTransport;
use super::state::RelayContext;
use super::views;
use anyhow::Result;
use autoforward_core::error::JobConflict;
use autoforward_core::job::JobHandle;
use autoforward_core::wizard::{
    conversation_error, ForwardMode, JobParams, SetupWizard, WizardOutcome,
};
use std::future::Future;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Bot commands. Every parameter is collected conversationally.
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Supported commands:")]
pub enum Command {
    /// Show usage help
    #[command(description = "Show usage help.")]
    Start,
    /// Set up a plain forwarding job
    #[command(description = "Forward a channel's history.")]
    Forward,
    /// Set up a forwarding job that rewrites captions
    #[command(description = "Forward and rewrite captions.")]
    ForwardEdit,
    /// Show the job slot and open setups
    #[command(description = "Show current status.")]
    Status,
    /// Stop the running job
    #[command(description = "Stop the running job.")]
    Stop,
}

/// Safely extract the sender id, `0` when unknown.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

async fn reply_html(bot: &Bot, msg: &Message, text: impl Into<String>) -> Result<()> {
    bot.send_message(msg.chat.id, text.into())
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handler for `/start`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    reply_html(&bot, &msg, views::help_text()).await
}

/// Handler for `/forward` and `/forward_edit`: open a setup session.
///
/// Any session the user already had is replaced.
///
/// # Errors
///
/// Returns an error if the first prompt cannot be sent; the session is
/// dropped in that case.
pub async fn open_setup(
    bot: Bot,
    msg: Message,
    context: Arc<RelayContext>,
    mode: ForwardMode,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let prompt = context.wizard.open(user_id, mode, msg.chat.id.0).await;
    with_session_guard(&context.wizard, user_id, || reply_html(&bot, &msg, prompt)).await?;
    info!(user_id, ?mode, "Setup opened");
    Ok(())
}

/// Run `op` on behalf of `user_id`'s session, dropping the session if it fails.
async fn with_session_guard<F, Fut>(wizard: &SetupWizard, user_id: i64, op: F) -> Result<()>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let result = op().await;
    if result.is_err() && wizard.abort(user_id).await {
        warn!(user_id, "Setup session dropped after a failed step");
    }
    result
}

/// Handler for `/status`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn status(bot: Bot, msg: Message, context: Arc<RelayContext>) -> Result<()> {
    let status = context.supervisor.status().await;
    let sessions = context.wizard.store().len().await;
    reply_html(&bot, &msg, views::status_text(&status, sessions)).await
}

/// Handler for `/stop`.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn stop(bot: Bot, msg: Message, context: Arc<RelayContext>) -> Result<()> {
    let outcome = context.supervisor.request_stop().await;
    info!(user_id = get_user_id_safe(&msg), ?outcome, "Stop command");
    reply_html(&bot, &msg, views::stop_text(outcome)).await
}

/// What the router does with one wizard outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationAction {
    /// Send this HTML reply and keep waiting
    Reply(String),
    /// Hand the collected parameters to the supervisor
    Launch(JobParams),
}

impl From<WizardOutcome> for ConversationAction {
    fn from(outcome: WizardOutcome) -> Self {
        match outcome {
            WizardOutcome::Prompt(reply)
            | WizardOutcome::Retry(reply)
            | WizardOutcome::Error(reply) => Self::Reply(reply),
            WizardOutcome::Complete(params) => Self::Launch(params),
        }
    }
}

/// Reply owed to the user after a launch attempt, if any.
///
/// A started job announces itself through its own status messages.
#[must_use]
pub fn launch_reply(result: &Result<JobHandle, JobConflict>) -> Option<&'static str> {
    match result {
        Ok(_) => None,
        Err(JobConflict) => Some(views::conflict_text()),
    }
}

/// Feed a private text message to the sender's open setup session.
///
/// Messages from users without a session are ignored. When handling fails,
/// the session is dropped and the user is told so.
///
/// # Errors
///
/// Returns an error only if the failure notice itself cannot be sent.
pub async fn handle_conversation(
    bot: Bot,
    msg: Message,
    context: Arc<RelayContext>,
) -> Result<()> {
    let user_id = get_user_id_safe(&msg);
    let step = with_session_guard(&context.wizard, user_id, || {
        advance_conversation(&bot, &msg, &context)
    })
    .await;
    if let Err(e) = step {
        error!(user_id, error = %e, "Conversation step failed");
        reply_html(&bot, &msg, conversation_error(&e.to_string())).await?;
    }
    Ok(())
}

async fn advance_conversation(bot: &Bot, msg: &Message, context: &RelayContext) -> Result<()> {
    let user_id = get_user_id_safe(msg);
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(outcome) = context.wizard.advance(user_id, text).await else {
        return Ok(());
    };

    match ConversationAction::from(outcome) {
        ConversationAction::Reply(reply) => reply_html(bot, msg, reply).await,
        ConversationAction::Launch(params) => {
            let transport = Arc::new(TelegramJobTransport::new(
                bot.clone(),
                ChatId(params.origin_chat),
            ));
            let launched = context
                .supervisor
                .try_start(&params, Arc::clone(&context.client), transport)
                .await;
            if let Some(reply) = launch_reply(&launched) {
                warn!(user_id, "Job rejected: another job is active");
                return reply_html(bot, msg, reply).await;
            }
            if let Ok(handle) = launched {
                info!(user_id, job_id = %handle.id(), "Forwarding job launched");
                tokio::spawn(watch_job(user_id, handle));
            }
            Ok(())
        }
    }
}

/// Log the final report of a job against the user who launched it.
async fn watch_job(user_id: i64, handle: JobHandle) {
    let job_id = handle.id();
    match handle.wait().await {
        Some(report) => info!(
            user_id,
            %job_id,
            forwarded = report.counters.forwarded,
            edited = report.counters.edited,
            failed = report.counters.failed,
            outcome = ?report.outcome,
            "Job report"
        ),
        None => error!(user_id, %job_id, "Job ended without a report"),
    }
}
