//! Answer handler: decides whether an incoming message should be answered,
//! builds the conversation, retrieves the answer (batched or streamed), and
//! relays the result back into the channel.

use answer_client::{AnswerBackend, AnswerConfig, WordCallback};
use async_trait::async_trait;
use qbot_core::{ChatPlatform, Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::conversation::build_conversation;
use crate::mention;
use crate::relay::StreamRelay;

/// Pipeline switches for the answer handler. One settings object replaces the
/// near-duplicate bot variants (with/without streaming, history, filtering).
#[derive(Debug, Clone)]
pub struct AnswerSettings {
    pub bot_name: String,
    pub use_streaming: bool,
    pub history_window: usize,
    pub relevance_filter_enabled: bool,
    pub thinking_message: String,
    pub follow_up_message: Option<String>,
}

impl AnswerSettings {
    /// Builds settings from an [`AnswerConfig`] plus the bot's display name.
    pub fn from_config(bot_name: impl Into<String>, config: &dyn AnswerConfig) -> Self {
        Self {
            bot_name: bot_name.into(),
            use_streaming: config.use_streaming(),
            history_window: config.history_window(),
            relevance_filter_enabled: config.relevance_filter_enabled(),
            thinking_message: config.thinking_message().to_string(),
            follow_up_message: config.follow_up_message().map(String::from),
        }
    }
}

/// What made the bot consider answering a message.
enum Trigger {
    /// The bot was @-mentioned; always answered, no relevance filter.
    Mention,
    /// The message looks like a question; subject to the relevance filter.
    Question,
}

/// Handler that answers questions via the remote backend.
///
/// **External interactions:** [`ChatPlatform`] (send/edit/history),
/// [`AnswerBackend`] (retrieval + relevance).
pub struct AnswerHandler {
    platform: Arc<dyn ChatPlatform>,
    backend: Arc<dyn AnswerBackend>,
    settings: AnswerSettings,
}

impl AnswerHandler {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        backend: Arc<dyn AnswerBackend>,
        settings: AnswerSettings,
    ) -> Self {
        Self {
            platform,
            backend,
            settings,
        }
    }

    fn trigger_for(&self, message: &Message) -> Option<Trigger> {
        if mention::is_bot_mentioned(&message.content, &self.settings.bot_name) {
            return Some(Trigger::Mention);
        }
        if question_detector::is_question(&message.content) {
            return Some(Trigger::Question);
        }
        None
    }

    /// Runs the relevance filter for question-triggered messages. Returns
    /// false when the question should be dropped (silently, by design).
    async fn passes_relevance_filter(&self, message: &Message) -> bool {
        match self.backend.evaluate_relevance(&message.content).await {
            Ok(verdict) if verdict.is_relevant => true,
            Ok(verdict) => {
                info!(
                    user_id = message.user.id,
                    explanation = %verdict.explanation,
                    "Question not relevant; dropping silently"
                );
                false
            }
            Err(e) => {
                warn!(
                    user_id = message.user.id,
                    error = %e,
                    "Relevance evaluation failed; dropping question"
                );
                false
            }
        }
    }

    async fn send_follow_up(&self, message: &Message) {
        if let Some(text) = &self.settings.follow_up_message {
            if let Err(e) = self.platform.send_message(&message.channel, text).await {
                warn!(error = %e, "Failed to send follow-up message");
            }
        }
    }

    async fn process_batched(&self, message: &Message) -> Result<HandlerResponse> {
        let conversation =
            build_conversation(self.platform.as_ref(), message, self.settings.history_window)
                .await;

        match self.backend.answer(conversation).await {
            Ok(text) => {
                if let Err(e) = self.platform.reply_to(message, &text).await {
                    error!(error = %e, "Failed to send answer");
                    return Ok(HandlerResponse::Stop);
                }
                self.send_follow_up(message).await;
                Ok(HandlerResponse::Reply(text))
            }
            Err(e) => {
                error!(user_id = message.user.id, error = %e, "Answer retrieval failed");
                if let Err(send_err) = self.platform.reply_to(message, &e.to_string()).await {
                    error!(error = %send_err, "Failed to send failure notice");
                }
                Ok(HandlerResponse::Stop)
            }
        }
    }

    async fn process_streaming(&self, message: &Message) -> Result<HandlerResponse> {
        let conversation =
            build_conversation(self.platform.as_ref(), message, self.settings.history_window)
                .await;

        let relay = match StreamRelay::begin(
            self.platform.clone(),
            message.channel.clone(),
            &self.settings.thinking_message,
        )
        .await
        {
            Ok(relay) => Arc::new(tokio::sync::Mutex::new(relay)),
            Err(e) => {
                error!(error = %e, "Failed to send placeholder message");
                return Ok(HandlerResponse::Stop);
            }
        };

        let relay_for_words = relay.clone();
        let mut on_word: Box<WordCallback> = Box::new(move |word: String| {
            let relay = relay_for_words.clone();
            Box::pin(async move {
                relay.lock().await.push_word(&word).await;
                Ok(())
            })
        });

        match self
            .backend
            .answer_stream(conversation, on_word.as_mut())
            .await
        {
            Ok(full_text) => {
                self.send_follow_up(message).await;
                Ok(HandlerResponse::Reply(full_text))
            }
            Err(e) => {
                error!(user_id = message.user.id, error = %e, "Answer stream failed");
                if let Err(edit_err) = relay.lock().await.replace(&e.to_string()).await {
                    warn!(error = %edit_err, "Failed to show failure notice");
                }
                Ok(HandlerResponse::Stop)
            }
        }
    }
}

#[async_trait]
impl Handler for AnswerHandler {
    #[instrument(skip(self, message))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.user.is_bot {
            return Ok(HandlerResponse::Continue);
        }

        let trigger = match self.trigger_for(message) {
            Some(t) => t,
            None => return Ok(HandlerResponse::Continue),
        };

        if matches!(trigger, Trigger::Question)
            && self.settings.relevance_filter_enabled
            && !self.passes_relevance_filter(message).await
        {
            return Ok(HandlerResponse::Stop);
        }

        info!(
            user_id = message.user.id,
            channel_id = message.channel.id,
            streaming = self.settings.use_streaming,
            "Processing answer query"
        );

        if self.settings.use_streaming {
            self.process_streaming(message).await
        } else {
            self.process_batched(message).await
        }
    }
}
