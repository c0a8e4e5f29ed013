//! HTTP implementation of [`AnswerBackend`] against the backend's
//! chat-completion endpoint.
//!
//! Both variants POST the same payload; the streaming variant reads the body
//! incrementally and drives the word chunker, the batched variant reads the
//! full text upfront. Either way exactly one `Ok(text)` or one
//! [`AnswerError`] comes out.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::AnswerError;
use crate::relevance::Relevance;
use crate::sse::{decode_body, SseDecoder};
use crate::words::WordChunker;
use crate::{AnswerBackend, ChatMessage, WordCallback};

pub(crate) const ANSWER_ENDPOINT: &str = "/api/v1/chat/premium_message";

/// Request payload for the chat-completion endpoint. Sampling parameters are
/// pinned to greedy decoding: answers must be reproducible for a conversation.
#[derive(Debug, Serialize)]
struct AnswerRequest<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
    stream: bool,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
    top_p: f32,
}

impl<'a> AnswerRequest<'a> {
    fn new(messages: &'a [ChatMessage], model: &'a str, stream: bool) -> Self {
        Self {
            messages,
            model,
            stream,
            temperature: 0.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            top_p: 0.0,
        }
    }
}

/// Answer-backend client over HTTP. Holds one shared connection pool; safe to
/// clone and use from concurrent tasks, each request on its own scope.
#[derive(Debug, Clone)]
pub struct HttpAnswerClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_token: String,
    model: String,
    relevance_statement: String,
}

impl HttpAnswerClient {
    /// Creates a client for the given backend base URL and bearer token.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_token: api_token.into(),
            model: "ofCourse".to_string(),
            relevance_statement: crate::relevance::DEFAULT_RELEVANCE_STATEMENT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the logical statement the relevance endpoint evaluates messages against.
    pub fn with_relevance_statement(mut self, statement: impl Into<String>) -> Self {
        self.relevance_statement = statement.into();
        self
    }

    pub(crate) fn relevance_statement(&self) -> &str {
        &self.relevance_statement
    }

    async fn post_answer_request(
        &self,
        conversation: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, AnswerError> {
        let url = format!("{}{}", self.base_url, ANSWER_ENDPOINT);
        let payload = AnswerRequest::new(conversation, &self.model, stream);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(AnswerError::network)?;

        let status = response.status();
        if !status.is_success() {
            // Do not parse the body of an error response.
            return Err(AnswerError::HttpStatus(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl AnswerBackend for HttpAnswerClient {
    #[instrument(skip(self, conversation))]
    async fn answer(&self, conversation: Vec<ChatMessage>) -> Result<String, AnswerError> {
        info!(
            message_count = conversation.len(),
            model = %self.model,
            "Requesting answer (batched)"
        );
        let response = self.post_answer_request(&conversation, false).await?;
        let body = response.text().await.map_err(AnswerError::network)?;

        let text: String = decode_body(&body)
            .into_iter()
            .filter(|c| !c.done)
            .map(|c| c.content)
            .collect();

        info!(answer_len = text.len(), "Answer retrieved");
        Ok(text)
    }

    #[instrument(skip(self, conversation, on_word))]
    async fn answer_stream(
        &self,
        conversation: Vec<ChatMessage>,
        on_word: &mut WordCallback,
    ) -> Result<String, AnswerError> {
        info!(
            message_count = conversation.len(),
            model = %self.model,
            "Requesting answer (streaming)"
        );
        let response = self.post_answer_request(&conversation, true).await?;

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();
        let mut chunker = WordChunker::new();
        let mut full_text = String::new();
        let mut terminal_seen = false;

        'body: while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(AnswerError::network)?;
            for chunk in decoder.push(&bytes) {
                if chunk.done {
                    terminal_seen = true;
                    break 'body;
                }
                full_text.push_str(&chunk.content);
                for word in chunker.push(&chunk.content) {
                    on_word(word)
                        .await
                        .map_err(|e| AnswerError::Platform(e.to_string()))?;
                }
            }
        }

        if !terminal_seen {
            // Body ended without the sentinel; flush an unterminated last line.
            for chunk in decoder.finish() {
                if chunk.done {
                    break;
                }
                full_text.push_str(&chunk.content);
                for word in chunker.push(&chunk.content) {
                    on_word(word)
                        .await
                        .map_err(|e| AnswerError::Platform(e.to_string()))?;
                }
            }
        }

        if let Some(last) = chunker.finish() {
            on_word(last)
                .await
                .map_err(|e| AnswerError::Platform(e.to_string()))?;
        }

        info!(answer_len = full_text.len(), "Answer stream finished");
        Ok(full_text)
    }

    #[instrument(skip(self, text))]
    async fn evaluate_relevance(&self, text: &str) -> Result<Relevance, AnswerError> {
        self.evaluate_statement(text).await
    }
}
