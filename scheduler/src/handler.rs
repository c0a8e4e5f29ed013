//! Find-time command handler: starts scheduling sessions and routes thread
//! messages to the session that owns them.

use async_trait::async_trait;
use chrono::Utc;
use qbot_core::{ChatPlatform, Handler, HandlerResponse, Message, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, instrument, warn};

use crate::analyzer::AvailabilityAnalyzer;
use crate::session::{ScheduleSession, DEFAULT_COLLECTION_WINDOW};

pub const FIND_TIME_COMMAND: &str = "/find_time";

const AVAILABILITY_PROMPT: &str = "Let's find a common time!\n\n\
    Please share your availability for this week and next week using the format below:\n\
    This week:\n\
    - Monday 2-5pm\n\
    - Wednesday 1-4pm\n\
    \n\
    Next week:\n\
    - Tuesday 3-6pm\n\
    - Thursday 2-4pm";

/// Extracts mentioned names from command text: every `@name` token, trimmed
/// of trailing punctuation.
pub fn parse_mentions(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .map(|name| name.trim_matches(|c: char| !c.is_alphanumeric() && c != '_'))
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Handles `/find_time @a @b`: creates the scheduling thread, spawns the
/// collection session, and forwards thread messages to it.
pub struct ScheduleHandler {
    platform: Arc<dyn ChatPlatform>,
    analyzer: Arc<dyn AvailabilityAnalyzer>,
    sessions: Arc<Mutex<HashMap<i64, mpsc::UnboundedSender<Message>>>>,
    collection_window: Duration,
}

impl ScheduleHandler {
    pub fn new(platform: Arc<dyn ChatPlatform>, analyzer: Arc<dyn AvailabilityAnalyzer>) -> Self {
        Self {
            platform,
            analyzer,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            collection_window: DEFAULT_COLLECTION_WINDOW,
        }
    }

    /// Overrides the collection window (tests use short windows).
    pub fn with_collection_window(mut self, window: Duration) -> Self {
        self.collection_window = window;
        self
    }

    /// Platform failures in the command flow are reported to the invoking
    /// channel, never propagated out of the handler.
    async fn report(&self, message: &Message, text: &str) {
        if let Err(e) = self.platform.reply_to(message, text).await {
            warn!(channel_id = message.channel.id, error = %e, "Failed to send scheduling notice");
        }
    }

    async fn start_session(&self, message: &Message) -> Result<HandlerResponse> {
        let mut expected = parse_mentions(&message.content);
        if expected.is_empty() {
            self.report(
                message,
                "Please mention at least one user! Example: /find_time @user1 @user2",
            )
            .await;
            return Ok(HandlerResponse::Stop);
        }
        if !expected.contains(&message.user.name) {
            expected.push(message.user.name.clone());
        }

        let thread_name = format!("{} - Schedule Finding", Utc::now().format("%Y-%m-%d"));
        let thread = match self
            .platform
            .create_thread(&message.channel, &thread_name)
            .await
        {
            Ok(thread) => thread,
            Err(e) => {
                // Platform failures are reported to the invoking user, not propagated.
                error!(error = %e, "Failed to create scheduling thread");
                self.report(message, &format!("Error creating thread: {}", e))
                    .await;
                return Ok(HandlerResponse::Stop);
            }
        };

        if let Err(e) = self
            .platform
            .send_message(
                &thread,
                &format!(
                    "{}\n\nFinding available time slots for: {}",
                    AVAILABILITY_PROMPT,
                    expected.join(", ")
                ),
            )
            .await
        {
            error!(thread_id = thread.id, error = %e, "Failed to post availability prompt");
            self.report(message, &format!("Error starting scheduling session: {}", e))
                .await;
            return Ok(HandlerResponse::Stop);
        }
        self.report(message, "Created scheduling thread.").await;

        info!(
            thread_id = thread.id,
            participants = expected.len(),
            "Scheduling session started"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        self.sessions.lock().await.insert(thread.id, tx);

        let session = ScheduleSession::new(
            self.platform.clone(),
            self.analyzer.clone(),
            thread.clone(),
            expected,
            self.collection_window,
        );
        let sessions = self.sessions.clone();
        let thread_id = thread.id;
        tokio::spawn(async move {
            session.run(rx).await;
            sessions.lock().await.remove(&thread_id);
        });

        Ok(HandlerResponse::Stop)
    }
}

#[async_trait]
impl Handler for ScheduleHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.user.is_bot {
            return Ok(HandlerResponse::Continue);
        }

        // Messages in a tracked thread are availability input, not questions.
        {
            let mut sessions = self.sessions.lock().await;
            if let Some(tx) = sessions.get(&message.channel.id) {
                if tx.send(message.clone()).is_ok() {
                    return Ok(HandlerResponse::Stop);
                }
                // Session already finished; stop tracking the thread.
                sessions.remove(&message.channel.id);
            }
        }

        if message.content.trim_start().starts_with(FIND_TIME_COMMAND) {
            return self.start_session(message).await;
        }

        Ok(HandlerResponse::Continue)
    }
}
