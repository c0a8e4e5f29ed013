//! Topical-relevance evaluation via the backend's logical-statement endpoint.
//!
//! The endpoint judges whether a configured statement holds for the given
//! message and returns a verdict plus rationale. No auth header is required.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::HttpAnswerClient;
use crate::error::AnswerError;

pub(crate) const RELEVANCE_ENDPOINT: &str = "/api/v1/evaluate-logical-statement";

/// Default statement: the deployment answers university course questions only.
pub(crate) const DEFAULT_RELEVANCE_STATEMENT: &str =
    "This message or question is related to UNSW (University of New South Wales) course information";

/// Verdict of one relevance evaluation.
#[derive(Debug, Clone)]
pub struct Relevance {
    pub is_relevant: bool,
    pub explanation: String,
}

#[derive(Debug, Serialize)]
struct RelevanceRequest<'a> {
    logical_statement: &'a str,
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelevanceResponse {
    is_true: bool,
    #[serde(default)]
    explanation: String,
}

impl HttpAnswerClient {
    /// Evaluates the configured relevance statement against `context`.
    pub(crate) async fn evaluate_statement(
        &self,
        context: &str,
    ) -> Result<Relevance, AnswerError> {
        let url = format!("{}{}", self.base_url, RELEVANCE_ENDPOINT);
        let payload = RelevanceRequest {
            logical_statement: self.relevance_statement(),
            context,
        };

        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(AnswerError::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnswerError::HttpStatus(status.as_u16()));
        }

        let verdict: RelevanceResponse = response.json().await.map_err(AnswerError::network)?;
        info!(
            is_relevant = verdict.is_true,
            explanation = %verdict.explanation,
            "Relevance evaluation result"
        );

        Ok(Relevance {
            is_relevant: verdict.is_true,
            explanation: verdict.explanation,
        })
    }
}
