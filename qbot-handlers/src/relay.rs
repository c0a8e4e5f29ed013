//! Stream relay: turns the word sequence of a streamed answer into a visibly
//! growing platform message (send placeholder, then edit in place).

use qbot_core::{Channel, ChatPlatform, Result};
use std::sync::Arc;
use tracing::warn;

/// Consecutive edit failures after which further edits are skipped. The
/// retrieval itself keeps running either way (e.g. the triggering message was
/// deleted and the platform silently rejects edits).
const MAX_CONSECUTIVE_EDIT_FAILURES: u32 = 3;

/// Drives one streamed reply: owns the placeholder message and the running
/// display buffer. Each word is appended with a trailing space and the
/// placeholder is overwritten, so the final displayed content equals the full
/// text plus one trailing space.
pub struct StreamRelay {
    platform: Arc<dyn ChatPlatform>,
    channel: Channel,
    message_id: String,
    display: String,
    consecutive_failures: u32,
}

impl StreamRelay {
    /// Sends the placeholder message and returns the relay bound to it.
    pub async fn begin(
        platform: Arc<dyn ChatPlatform>,
        channel: Channel,
        placeholder: &str,
    ) -> Result<Self> {
        let message_id = platform
            .send_message_and_return_id(&channel, placeholder)
            .await?;
        Ok(Self {
            platform,
            channel,
            message_id,
            display: String::new(),
            consecutive_failures: 0,
        })
    }

    /// Appends one word to the display buffer and overwrites the placeholder.
    /// Edit failures are logged and tolerated, never surfaced.
    pub async fn push_word(&mut self, word: &str) {
        self.display.push_str(word);
        self.display.push(' ');

        if self.consecutive_failures >= MAX_CONSECUTIVE_EDIT_FAILURES {
            return;
        }

        match self
            .platform
            .edit_message(&self.channel, &self.message_id, &self.display)
            .await
        {
            Ok(()) => self.consecutive_failures = 0,
            Err(e) => {
                self.consecutive_failures += 1;
                warn!(
                    channel_id = self.channel.id,
                    message_id = %self.message_id,
                    failures = self.consecutive_failures,
                    error = %e,
                    "Edit failed while streaming reply"
                );
            }
        }
    }

    /// Replaces the whole displayed content, e.g. with a failure description.
    pub async fn replace(&self, text: &str) -> Result<()> {
        self.platform
            .edit_message(&self.channel, &self.message_id, text)
            .await
    }

    /// The currently displayed content.
    pub fn display(&self) -> &str {
        &self.display
    }
}
