//! Availability analysis via an OpenAI-compatible chat-completion API.

use anyhow::Result;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

const SYSTEM_PROMPT: &str =
    "You are a helpful scheduling assistant that analyzes availability and finds common time slots.";

/// Builds the analysis prompt from the collected (participant, availability)
/// pairs.
pub fn build_analysis_prompt(responses: &[(String, String)]) -> String {
    let mut prompt = String::from(
        "As a scheduling assistant, analyze these availability messages and:\n\
         1. Find all overlapping time slots between users\n\
         2. Format the response in markdown\n\
         3. If no common time is found, suggest who needs to provide more options\n\
         \n\
         Current availabilities:\n",
    );
    for (author, availability) in responses {
        prompt.push('\n');
        prompt.push_str(author);
        prompt.push_str(": ");
        prompt.push_str(availability);
    }
    prompt.push_str(
        "\n\n\
         Please provide your analysis in this format:\n\
         ## This Week\n\
         - Common slots: [list overlapping times]\n\
         - Alternative slots: [if no common slots, suggest alternatives]\n\
         \n\
         ## Next Week\n\
         - Common slots: [list overlapping times]\n\
         - Alternative slots: [if no common slots, suggest alternatives]\n\
         \n\
         ## Recommendations\n\
         [If needed, suggest who should provide more options and what times might work]\n",
    );
    prompt
}

/// Analysis seam, so sessions can be tested without the OpenAI API.
#[async_trait]
pub trait AvailabilityAnalyzer: Send + Sync {
    /// Returns a markdown analysis of the collected availabilities.
    async fn analyze(&self, responses: &[(String, String)]) -> Result<String>;
}

/// OpenAI-backed analyzer.
#[derive(Clone)]
pub struct OpenAiAnalyzer {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiAnalyzer {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model: "gpt-3.5-turbo".to_string(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl AvailabilityAnalyzer for OpenAiAnalyzer {
    #[instrument(skip(self, responses))]
    async fn analyze(&self, responses: &[(String, String)]) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(0.7)
            .max_tokens(500u32)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(build_analysis_prompt(responses))
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = self.client.chat().create(request).await?;
        match response.choices.first() {
            Some(choice) => Ok(choice.message.content.clone().unwrap_or_default()),
            None => anyhow::bail!("No analysis in response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_lists_every_participant_in_order() {
        let responses = vec![
            ("alice".to_string(), "Monday 2-5pm".to_string()),
            ("bob".to_string(), "Monday 3-6pm".to_string()),
        ];
        let prompt = build_analysis_prompt(&responses);

        let alice = prompt.find("alice: Monday 2-5pm").unwrap();
        let bob = prompt.find("bob: Monday 3-6pm").unwrap();
        assert!(alice < bob);
        assert!(prompt.contains("## This Week"));
        assert!(prompt.contains("## Recommendations"));
    }
}
