//! HTML status texts for forwarding jobs.

use super::{Job, JobCounters, JobOutcome};
use crate::channel::CaptionEdit;
use crate::error::JobError;
use crate::wizard::ForwardMode;
use html_escape::encode_text;

fn title(job: &Job) -> (&'static str, &'static str) {
    match job.mode() {
        ForwardMode::Simple => ("🚀", "Auto-Forward"),
        ForwardMode::Edit => ("🔧", "Edit-Forward"),
    }
}

fn endpoints(job: &Job) -> String {
    format!(
        "<b>Source:</b> <code>{}</code>\n<b>Destination:</b> <code>{}</code>\n",
        encode_text(&job.source),
        encode_text(&job.destination)
    )
}

fn limit_label(limit: Option<usize>) -> String {
    limit.map_or_else(|| "No limit".to_string(), |n| n.to_string())
}

/// Human description of a caption edit, e.g. `remove 'promo'`.
#[must_use]
pub fn edit_action(edit: &CaptionEdit) -> String {
    if edit.removes() {
        format!("remove '{}'", encode_text(&edit.find_text))
    } else {
        format!(
            "replace '{}' with '{}'",
            encode_text(&edit.find_text),
            encode_text(&edit.replace_text)
        )
    }
}

/// Short acknowledgment sent as soon as a job is accepted.
#[must_use]
pub fn launch_ack() -> String {
    "🚀 <b>Starting auto-forward...</b>".to_string()
}

/// Initial status message.
#[must_use]
pub fn started(job: &Job) -> String {
    let (icon, name) = title(job);
    let mut text = format!("{icon} <b>{name} Started</b>\n{}", endpoints(job));
    if let Some(edit) = &job.caption_edit {
        text.push_str(&format!("<b>Editing:</b> {}\n", edit_action(edit)));
    }
    text.push_str(&format!(
        "<b>Limit:</b> {}\n<b>Status:</b> Starting...\n",
        limit_label(job.limit)
    ));
    match job.mode() {
        ForwardMode::Simple => text.push_str("<b>Progress:</b> 0 messages"),
        ForwardMode::Edit => text.push_str("<b>Progress:</b> 0 messages (0 edited)"),
    }
    text
}

/// Periodic progress edit.
#[must_use]
pub fn progress(job: &Job, counters: &JobCounters) -> String {
    let (icon, name) = title(job);
    let mut text = format!(
        "{icon} <b>{name} Progress</b>\n{}<b>Status:</b> Running...\n<b>Progress:</b> {} messages forwarded",
        endpoints(job),
        counters.forwarded
    );
    if job.mode() == ForwardMode::Edit {
        text.push_str(&format!("\n<b>Edited:</b> {} captions", counters.edited));
    }
    if counters.failed > 0 {
        text.push_str(&format!("\n<b>Failed:</b> {}", counters.failed));
    }
    text
}

/// Final summary written over the status message.
#[must_use]
pub fn summary(job: &Job, counters: &JobCounters, outcome: &JobOutcome) -> String {
    let (_, name) = title(job);
    let (headline, status) = match outcome {
        JobOutcome::Stopped => (format!("🛑 <b>{name} Stopped</b>"), "Stopped by request"),
        _ => (format!("✅ <b>{name} Completed!</b>"), "Successfully finished!"),
    };
    let mut text = format!(
        "{headline}\n{}<b>Total Forwarded:</b> {} messages\n",
        endpoints(job),
        counters.forwarded
    );
    if let Some(edit) = &job.caption_edit {
        text.push_str(&format!(
            "<b>Captions Edited:</b> {}\n<b>Action:</b> {}\n",
            counters.edited,
            edit_action(edit)
        ));
    }
    if counters.failed > 0 {
        text.push_str(&format!("<b>Failed:</b> {}\n", counters.failed));
    }
    text.push_str(&format!("<b>Status:</b> {status}"));
    text
}

/// Separate acknowledgment sent after the summary.
#[must_use]
pub fn completion_ack(outcome: &JobOutcome) -> String {
    match outcome {
        JobOutcome::Stopped => "🛑 <b>Job stopped.</b>".to_string(),
        _ => "🎉 <b>Job completed successfully!</b>".to_string(),
    }
}

/// Reply sent when the job dies.
#[must_use]
pub fn failure(job: &Job, error: &JobError) -> String {
    let (_, name) = title(job);
    format!(
        "❌ <b>{name} failed:</b> {}",
        encode_text(&error.to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobId;

    fn job(edit: Option<CaptionEdit>) -> Job {
        Job {
            id: JobId(1),
            source: "news".to_string(),
            destination: "@dest<x>".to_string(),
            caption_edit: edit,
            limit: None,
        }
    }

    #[test]
    fn started_escapes_user_values() {
        let text = started(&job(None));
        assert!(text.contains("@dest&lt;x&gt;"));
        assert!(text.contains("<b>Limit:</b> No limit"));
        assert!(text.ends_with("0 messages"));
    }

    #[test]
    fn edit_mode_reports_captions() {
        let edit = CaptionEdit {
            find_text: "promo".to_string(),
            replace_text: String::new(),
        };
        let job = job(Some(edit));
        let counters = JobCounters {
            forwarded: 40,
            edited: 3,
            failed: 0,
        };
        assert!(started(&job).contains("remove 'promo'"));
        assert!(progress(&job, &counters).contains("<b>Edited:</b> 3 captions"));

        let done = summary(&job, &counters, &JobOutcome::Exhausted);
        assert!(done.contains("<b>Captions Edited:</b> 3"));
        assert!(done.contains("Completed!"));
    }

    #[test]
    fn stopped_summary_differs() {
        let counters = JobCounters {
            forwarded: 7,
            edited: 0,
            failed: 2,
        };
        let done = summary(&job(None), &counters, &JobOutcome::Stopped);
        assert!(done.starts_with("🛑"));
        assert!(done.contains("<b>Total Forwarded:</b> 7 messages"));
        assert!(done.contains("<b>Failed:</b> 2"));
        assert_eq!(completion_ack(&JobOutcome::Stopped), "🛑 <b>Job stopped.</b>");
    }
}
