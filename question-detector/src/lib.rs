//! # question-detector
//!
//! Heuristic question detection for chat messages. Pure text classification,
//! no I/O: a message counts as a question when it contains a question mark,
//! starts with an interrogative word, or contains a common question phrase.
//!
//! Used by qbot-handlers to decide whether an unaddressed channel message
//! should be answered at all.

/// Interrogative words that mark a question when they open the message.
const QUESTION_STARTERS: &[&str] = &[
    "what", "when", "where", "who", "whom", "whose", "which", "why", "how",
];

/// Phrases that mark a question anywhere in the message.
const QUESTION_PATTERNS: &[&str] = &[
    "can you",
    "could you",
    "will you",
    "do you",
    "does anyone",
    "is there",
    "are there",
    "am i",
];

/// Returns true if `text` looks like a question.
pub fn is_question(text: &str) -> bool {
    let text = text.to_lowercase();

    if text.contains('?') {
        return true;
    }

    if let Some(first_word) = text.split_whitespace().next() {
        if QUESTION_STARTERS.contains(&first_word) {
            return true;
        }
    }

    QUESTION_PATTERNS.iter().any(|p| text.contains(p))
}
