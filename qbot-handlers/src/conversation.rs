//! Builds the ordered conversation sent to the answer backend: up to
//! `window` prior turns plus the current message.

use answer_client::ChatMessage;
use qbot_core::{ChatPlatform, Message};
use tracing::warn;

/// Assembles the request conversation for one incoming message.
///
/// Prior messages come from the platform newest-first and are reversed to
/// chronological order. Bot turns become `assistant` entries with raw
/// content; other turns become `user` entries prefixed with the author's
/// display name. The current message is appended last as a `user` entry, so
/// the result holds min(window, available history) + 1 messages.
///
/// A history-fetch failure degrades to a one-message conversation.
pub async fn build_conversation(
    platform: &dyn ChatPlatform,
    message: &Message,
    window: usize,
) -> Vec<ChatMessage> {
    let mut history = if window == 0 {
        Vec::new()
    } else {
        match platform
            .fetch_history(&message.channel, &message.id, window)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    channel_id = message.channel.id,
                    error = %e,
                    "History fetch failed; answering without context"
                );
                Vec::new()
            }
        }
    };
    history.reverse();

    let mut conversation: Vec<ChatMessage> = history
        .into_iter()
        .map(|entry| {
            if entry.from_bot {
                ChatMessage::assistant(entry.content)
            } else {
                ChatMessage::user(format!("{}: {}", entry.author_name, entry.content))
            }
        })
        .collect();

    conversation.push(ChatMessage::user(message.content.clone()));
    conversation
}
