//! Messaging-platform abstraction: sending, editing, history, threads.
//!
//! The bot never talks to a platform SDK directly; everything goes through
//! [`ChatPlatform`] so handlers and tests can run against any transport.

use crate::error::Result;
use crate::types::{Channel, Message};
use async_trait::async_trait;

/// One prior message as returned by [`ChatPlatform::fetch_history`].
/// History is returned newest-first; callers reverse it for chronological order.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub author_name: String,
    pub from_bot: bool,
    pub content: String,
}

/// Abstraction over the messaging platform. Implementations map to a concrete
/// transport (or to an in-memory console/test double).
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Sends a text message to the given channel.
    async fn send_message(&self, channel: &Channel, text: &str) -> Result<()>;

    /// Sends a reply to the given message (same channel).
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;

    /// Sends a message and returns its id, for later [`Self::edit_message`]
    /// calls when streaming a growing reply.
    async fn send_message_and_return_id(&self, channel: &Channel, text: &str) -> Result<String>;

    /// Edits an already-sent message. `message_id` is transport-specific.
    async fn edit_message(&self, channel: &Channel, message_id: &str, text: &str) -> Result<()>;

    /// Returns up to `limit` messages sent before `before_message_id` in the
    /// channel, newest-first.
    async fn fetch_history(
        &self,
        channel: &Channel,
        before_message_id: &str,
        limit: usize,
    ) -> Result<Vec<HistoryEntry>>;

    /// Creates a thread under the given channel and returns it as a new channel.
    async fn create_thread(&self, channel: &Channel, name: &str) -> Result<Channel>;
}
