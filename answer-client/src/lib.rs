//! # answer-client
//!
//! Client for the remote question-answering backend: the answer-retrieval and
//! response-streaming pipeline. Defines the [`AnswerBackend`] trait and the
//! HTTP implementation [`HttpAnswerClient`], plus the SSE stream decoder and
//! the word chunker used by the streaming path.
//!
//! The stream method takes a boxed callback so that [`AnswerBackend`] is
//! object-safe (dyn compatible).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

mod account;
mod client;
mod config;
mod error;
mod relevance;
pub mod sse;
pub mod words;

pub use account::AccountInfo;
pub use client::HttpAnswerClient;
pub use config::{AnswerConfig, EnvAnswerConfig};
pub use error::AnswerError;
pub use relevance::Relevance;
pub use sse::{decode_body, decode_line, SseDecoder, StreamChunk, DONE_SENTINEL};
pub use words::WordChunker;

/// Role of a conversational turn, one-to-one with the backend's wire `role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single conversational turn. Immutable once constructed; lives for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Type-erased callback invoked once per completed word in the streaming
/// path. Boxed so that [`AnswerBackend`] stays dyn compatible.
pub type WordCallback =
    dyn FnMut(String) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send;

/// Backend interface: retrieve an answer for a conversation, batched or
/// streamed word-by-word, and evaluate topical relevance of a message.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Returns the full answer text for the given conversation (batched variant).
    async fn answer(&self, conversation: Vec<ChatMessage>) -> Result<String, AnswerError>;

    /// Streaming variant: invokes `on_word` for each completed word while the
    /// reply is generated, and returns the full concatenated text.
    async fn answer_stream(
        &self,
        conversation: Vec<ChatMessage>,
        on_word: &mut WordCallback,
    ) -> Result<String, AnswerError>;

    /// Evaluates whether `text` is topically relevant (external predicate +
    /// rationale).
    async fn evaluate_relevance(&self, text: &str) -> Result<Relevance, AnswerError>;

    /// Normalizes a bare question into a one-message conversation and retrieves
    /// the answer.
    async fn answer_question(&self, question: &str) -> Result<String, AnswerError> {
        self.answer(vec![ChatMessage::user(question)]).await
    }
}
