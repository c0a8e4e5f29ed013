//! One scheduling session: collects availability messages from the expected
//! participants inside a wall-clock window and posts an analysis after each
//! new response.

use qbot_core::{Channel, ChatPlatform, Message};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{info, warn};

use crate::analyzer::AvailabilityAnalyzer;

/// Wall-clock window for collecting availability responses. This bounds the
/// wait for external input, not any HTTP call.
pub const DEFAULT_COLLECTION_WINDOW: Duration = Duration::from_secs(300);

/// Collects first-response-per-participant messages from a thread and drives
/// the analyzer. One session per created thread; consumed by [`Self::run`].
pub struct ScheduleSession {
    platform: Arc<dyn ChatPlatform>,
    analyzer: Arc<dyn AvailabilityAnalyzer>,
    thread: Channel,
    expected: Vec<String>,
    window: Duration,
}

impl ScheduleSession {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        analyzer: Arc<dyn AvailabilityAnalyzer>,
        thread: Channel,
        expected: Vec<String>,
        window: Duration,
    ) -> Self {
        Self {
            platform,
            analyzer,
            thread,
            expected,
            window,
        }
    }

    async fn post(&self, text: &str) {
        if let Err(e) = self.platform.send_message(&self.thread, text).await {
            warn!(thread_id = self.thread.id, error = %e, "Failed to post in scheduling thread");
        }
    }

    async fn post_analysis(&self, responses: &[(String, String)], heading: &str) {
        match self.analyzer.analyze(responses).await {
            Ok(analysis) => self.post(&format!("{}\n{}", heading, analysis)).await,
            Err(e) => {
                warn!(error = %e, "Availability analysis failed");
                self.post(&format!("Error analyzing availabilities: {}", e))
                    .await;
            }
        }
    }

    fn still_waiting_for(&self, responses: &[(String, String)]) -> Vec<String> {
        self.expected
            .iter()
            .filter(|name| !responses.iter().any(|(author, _)| author == *name))
            .cloned()
            .collect()
    }

    /// Runs the collection loop until everyone responded, the window elapsed,
    /// or the message channel closed. Consumes the session.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<Message>) {
        let deadline = Instant::now() + self.window;
        let mut responses: Vec<(String, String)> = Vec::new();
        let mut timed_out = false;

        while responses.len() < self.expected.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let received = match timeout(remaining, rx.recv()).await {
                Err(_) => {
                    self.post(
                        "Scheduling timeout. Not all users responded within the window.",
                    )
                    .await;
                    timed_out = true;
                    break;
                }
                Ok(None) => break,
                Ok(Some(message)) => message,
            };

            let author = received.user.name.clone();
            if !self.expected.contains(&author)
                || responses.iter().any(|(name, _)| name == &author)
            {
                continue;
            }

            info!(
                thread_id = self.thread.id,
                author = %author,
                responded = responses.len() + 1,
                expected = self.expected.len(),
                "Availability received"
            );
            responses.push((author, received.content));

            self.post_analysis(&responses, "**Current Analysis:**").await;

            let waiting = self.still_waiting_for(&responses);
            if !waiting.is_empty() {
                self.post(&format!(
                    "Still waiting to hear from: {}",
                    waiting.join(", ")
                ))
                .await;
            }
        }

        if responses.is_empty() {
            return;
        }

        if timed_out || responses.len() < self.expected.len() {
            let responded: Vec<String> =
                responses.iter().map(|(name, _)| name.clone()).collect();
            let missing = self.still_waiting_for(&responses);
            self.post(&format!(
                "Scheduling incomplete.\n\nResponded users: {}\nMissing responses from: {}\n\nHere's the analysis based on available responses:",
                responded.join(", "),
                missing.join(", ")
            ))
            .await;
        } else {
            self.post("Everyone has responded! Here's the final schedule analysis:")
                .await;
        }
        self.post_analysis(&responses, "**Final Analysis:**").await;
    }
}
