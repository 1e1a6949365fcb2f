//! Static and status reply texts.

use autoforward_core::job::{StopOutcome, SupervisorStatus};
use html_escape::encode_text;

/// Welcome and usage text for `/start`.
#[must_use]
pub fn help_text() -> String {
    "🤖 <b>Auto-Forward Bot</b>\n\n\
     I copy the history of a public channel into another channel.\n\n\
     <b>Commands:</b>\n\
     /forward - forward messages as-is\n\
     /forward_edit - forward and rewrite captions\n\
     /status - show what the bot is doing\n\
     /stop - stop the running job\n\n\
     <b>Source formats:</b>\n\
     • <code>@channel</code>\n\
     • <code>channel</code>\n\
     • <code>https://t.me/channel</code>\n\n\
     The bot must be an admin in the destination channel."
        .to_string()
}

/// Text for `/status`.
#[must_use]
pub fn status_text(status: &SupervisorStatus, open_sessions: usize) -> String {
    let (headline, forwarding) = match status {
        SupervisorStatus::Idle => ("✅ <b>Ready</b>".to_string(), "No"),
        SupervisorStatus::Running {
            id,
            source,
            destination,
        } => (
            format!(
                "🔄 <b>Forwarding in progress</b> ({id})\n<code>{}</code> → <code>{}</code>",
                encode_text(source),
                encode_text(destination)
            ),
            "Yes",
        ),
        SupervisorStatus::Stopping { id } => {
            (format!("⏳ <b>Stopping</b> ({id})"), "Stopping")
        }
    };

    format!(
        "{headline}\n\n\
         📊 <b>Stats:</b>\n\
         • Forwarding: {forwarding}\n\
         • Open setups: {open_sessions}\n\n\
         💡 Use /forward to start a new job."
    )
}

/// Reply for `/stop`.
#[must_use]
pub fn stop_text(outcome: StopOutcome) -> &'static str {
    match outcome {
        StopOutcome::Requested => {
            "🛑 <b>Stopping forwarding.</b>\nThe job ends after the current message."
        }
        StopOutcome::AlreadyStopping => {
            "⏳ <b>Already stopping.</b>\nWaiting for the current message to finish."
        }
        StopOutcome::Idle => "ℹ️ <b>Nothing to stop.</b>\nNo forwarding job is running.",
    }
}

/// Reply when a finished setup collides with a running job.
#[must_use]
pub fn conflict_text() -> &'static str {
    "⚠️ <b>A forwarding job is already running.</b>\nUse /stop first, then start again."
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoforward_core::job::JobId;

    #[test]
    fn idle_status_reports_sessions() {
        let text = status_text(&SupervisorStatus::Idle, 2);
        assert!(text.contains("Ready"));
        assert!(text.contains("Forwarding: No"));
        assert!(text.contains("Open setups: 2"));
    }

    #[test]
    fn running_status_names_both_channels() {
        let text = status_text(
            &SupervisorStatus::Running {
                id: JobId(3),
                source: "news".to_string(),
                destination: "@out<x>".to_string(),
            },
            0,
        );
        assert!(text.contains("job-3"));
        assert!(text.contains("<code>news</code>"));
        assert!(text.contains("@out&lt;x&gt;"));
        assert!(text.contains("Forwarding: Yes"));
    }

    #[test]
    fn stopping_status_is_distinct() {
        let text = status_text(&SupervisorStatus::Stopping { id: JobId(1) }, 0);
        assert!(text.contains("Forwarding: Stopping"));
    }

    #[test]
    fn stop_replies_differ_by_outcome() {
        assert_ne!(stop_text(StopOutcome::Requested), stop_text(StopOutcome::Idle));
        assert!(stop_text(StopOutcome::Idle).contains("Nothing to stop"));
    }

    #[test]
    fn conflict_points_at_stop() {
        assert!(conflict_text().contains("/stop"));
    }
}
