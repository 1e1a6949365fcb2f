//! HTML texts sent while walking a user through job setup.

use super::{ForwardMode, SENTINEL};
use html_escape::encode_text;

pub(crate) fn source_prompt(mode: ForwardMode) -> String {
    let title = match mode {
        ForwardMode::Simple => "🔄 <b>Auto-Forward Setup</b>",
        ForwardMode::Edit => "🔧 <b>Auto-Forward with Caption Editing</b>",
    };
    format!(
        "{title}\n\n\
         📥 <b>Step 1:</b> send the <b>source channel</b>\n\
         • Username: <code>@channel_username</code>\n\
         • Public link: <code>https://t.me/channel_username</code>\n\n\
         Messages are read from this public channel. Numeric channel IDs \
         are not accepted here."
    )
}

pub(crate) fn destination_prompt() -> String {
    "✅ <b>Source channel saved!</b>\n\n\
     📤 <b>Step 2:</b> send the <b>destination channel</b>\n\
     • Username: <code>@channel_username</code>\n\
     • Channel ID: <code>-1001234567890</code>\n\n\
     ⚠️ The bot must be an admin in the destination channel."
        .to_string()
}

pub(crate) fn find_text_prompt() -> String {
    "✅ <b>Destination saved!</b>\n\n\
     🔍 <b>Step 3:</b> which text should be <b>found</b> in captions?\n\
     • <code>@Username</code>\n\
     • <code>unwanted text</code>"
        .to_string()
}

pub(crate) fn empty_find_text() -> String {
    "❌ The search text cannot be empty. Send the text to look for in captions.".to_string()
}

pub(crate) fn replace_text_prompt() -> String {
    format!(
        "✅ <b>Find text saved!</b>\n\n\
         ✏️ <b>Step 4:</b> what should it be <b>replaced with</b>?\n\
         • <code>new text</code> to replace\n\
         • <code>{SENTINEL}</code> to remove it completely"
    )
}

pub(crate) fn limit_prompt(step: u8, replace_text: Option<&str>) -> String {
    let header = match replace_text {
        Some("") => "✅ <b>Replace text saved!</b> (will remove)\n\n".to_string(),
        Some(text) => format!(
            "✅ <b>Replace text saved!</b> (will replace with '{}')\n\n",
            encode_text(text)
        ),
        None => "✅ <b>Destination saved!</b>\n\n".to_string(),
    };
    format!(
        "{header}📊 <b>Step {step}:</b> set the forwarding limit\n\
         Send a message count or <code>{SENTINEL}</code> for no limit:\n\
         • <code>100</code> forwards 100 messages\n\
         • <code>{SENTINEL}</code> forwards everything"
    )
}

pub(crate) fn invalid_limit() -> String {
    format!("❌ Limit must be a whole number greater than 0, or <code>{SENTINEL}</code> for no limit.")
}

/// Reply sent when a setup step fails and the session is dropped.
#[must_use]
pub fn conversation_error(error: &str) -> String {
    format!("❌ <b>Error in conversation:</b> {}", encode_text(error))
}
