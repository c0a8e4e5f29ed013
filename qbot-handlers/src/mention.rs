//! Pure helpers for @-mention detection. A mention of the bot always triggers
//! an answer, bypassing the relevance filter.

/// Returns true if `text` contains a @mention of the given bot name.
#[inline]
pub fn is_bot_mentioned(text: &str, bot_name: &str) -> bool {
    text.contains(&format!("@{}", bot_name))
}
