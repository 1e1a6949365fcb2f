//! Channel reference normalization and caption rewriting.

/// Prefix of public Telegram links (`https://t.me/<name>`).
pub const PUBLIC_LINK_PREFIX: &str = "https://t.me/";

/// Normalize a source channel reference to a bare username.
///
/// A public link is reduced to its final path segment, then any leading `@`
/// sigils are stripped. Applying it twice gives the same result as once.
///
/// # Examples
///
/// ```
/// use autoforward_core::channel::normalize_source;
/// assert_eq!(normalize_source("https://t.me/foo"), "foo");
/// assert_eq!(normalize_source("@foo"), "foo");
/// assert_eq!(normalize_source("foo"), "foo");
/// ```
#[must_use]
pub fn normalize_source(reference: &str) -> String {
    let reference = strip_sigils(reference);
    let tail = if reference.starts_with(PUBLIC_LINK_PREFIX) {
        strip_sigils(reference.rsplit('/').next().unwrap_or(reference))
    } else {
        reference
    };
    tail.to_string()
}

fn strip_sigils(value: &str) -> &str {
    value
        .trim_start_matches(|c: char| c == '@' || c.is_whitespace())
        .trim_end()
}

/// Find/replace pair applied to captions in edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionEdit {
    /// Literal text to look for
    pub find_text: String,
    /// Replacement; empty means the match is deleted
    pub replace_text: String,
}

impl CaptionEdit {
    /// Returns the rewritten caption when `caption` contains the find text,
    /// `None` when there is nothing to edit.
    #[must_use]
    pub fn apply(&self, caption: Option<&str>) -> Option<String> {
        let caption = caption?;
        if self.find_text.is_empty() || !caption.contains(&self.find_text) {
            return None;
        }
        Some(caption.replace(&self.find_text, &self.replace_text))
    }

    /// Whether matched text is removed rather than replaced.
    #[must_use]
    pub fn removes(&self) -> bool {
        self.replace_text.is_empty()
    }
}
