//! Answer-pipeline configuration: trait and env-based implementation.
//!
//! One config object collapses the near-duplicate bot variants: streaming
//! vs. batched delivery, history window, and the relevance filter are all
//! switches here rather than separate binaries.

use anyhow::{Context, Result};
use std::env;

/// Configuration interface for the answer pipeline.
pub trait AnswerConfig: Send + Sync {
    fn base_url(&self) -> &str;
    fn api_token(&self) -> &str;
    fn model(&self) -> &str;
    fn use_streaming(&self) -> bool;
    fn history_window(&self) -> usize;
    fn relevance_filter_enabled(&self) -> bool;
    fn relevance_statement(&self) -> Option<&str>;
    fn thinking_message(&self) -> &str;
    fn follow_up_message(&self) -> Option<&str>;
}

/// Answer config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvAnswerConfig {
    pub api_url: String,
    pub api_token: String,
    pub model: String,
    pub use_streaming: bool,
    pub history_window: usize,
    pub relevance_filter: bool,
    pub relevance_statement: Option<String>,
    pub thinking_message: String,
    pub follow_up_message: Option<String>,
}

impl AnswerConfig for EnvAnswerConfig {
    fn base_url(&self) -> &str {
        &self.api_url
    }
    fn api_token(&self) -> &str {
        &self.api_token
    }
    fn model(&self) -> &str {
        &self.model
    }
    fn use_streaming(&self) -> bool {
        self.use_streaming
    }
    fn history_window(&self) -> usize {
        self.history_window
    }
    fn relevance_filter_enabled(&self) -> bool {
        self.relevance_filter
    }
    fn relevance_statement(&self) -> Option<&str> {
        self.relevance_statement.as_deref()
    }
    fn thinking_message(&self) -> &str {
        &self.thinking_message
    }
    fn follow_up_message(&self) -> Option<&str> {
        self.follow_up_message.as_deref()
    }
}

impl EnvAnswerConfig {
    /// Loads from environment variables. `API_URL` and `API_TOKEN` are
    /// required; everything else has defaults.
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("API_URL").context("API_URL not set")?;
        let api_token = env::var("API_TOKEN").context("API_TOKEN not set")?;
        let model = env::var("MODEL").unwrap_or_else(|_| "ofCourse".to_string());
        let use_streaming = env::var("USE_STREAMING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);
        let history_window = env::var("HISTORY_WINDOW")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);
        let relevance_filter = env::var("RELEVANCE_FILTER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(true);
        let relevance_statement = env::var("RELEVANCE_STATEMENT")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let thinking_message =
            env::var("THINKING_MESSAGE").unwrap_or_else(|_| "Thinking...".to_string());
        let follow_up_message = env::var("FOLLOW_UP_MESSAGE")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Ok(Self {
            api_url,
            api_token,
            model,
            use_streaming,
            history_window,
            relevance_filter,
            relevance_statement,
            thinking_message,
            follow_up_message,
        })
    }
}
