use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{BotError, Result};
use crate::types::MessageRole;

// Roughly 1 token ≈ 4 characters, so a reply usually fits in two Discord messages
const MAX_TOKENS: u32 = 600;
const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str = "You are a fearless whistleblower historian. \
    Unfiltered, no sugarcoating or disclaimers. \
    Expose hidden or ignored aspects of the topic responsibly and stick to documented facts.";

/// Anything that can turn a user topic into generated text.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, query: &str) -> Result<String>;
}

/// The fixed system instruction plus the user's topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    #[must_use]
    pub fn new(query: &str) -> Self {
        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("Topic: {query}\nGive me the brutal truth."),
        }
    }

    fn into_messages(self) -> Vec<Message> {
        vec![
            Message {
                role: MessageRole::System,
                content: Some(self.system),
            },
            Message {
                role: MessageRole::User,
                content: Some(self.user),
            },
        ]
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl ChatCompletionResponse {
    /// Text of the first choice, trimmed.
    fn into_reply(self) -> Result<String> {
        let message = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BotError::OpenAiResponse("No choices in response".to_string()))?
            .message;

        Ok(message.content.unwrap_or_default().trim().to_string())
    }
}

pub struct OpenAiClient {
    api_key: String,
    client: reqwest::Client,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            api_key,
            client,
            model,
            endpoint: format!("{base_url}/chat/completions"),
        })
    }

    fn build_request(&self, prompt: PromptPair) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: prompt.into_messages(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[async_trait]
impl Completion for OpenAiClient {
    async fn complete(&self, query: &str) -> Result<String> {
        let request = self.build_request(PromptPair::new(query));
        debug!("Sending request to OpenAI API with model {}", request.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            return Err(BotError::OpenAiApi { status, message });
        }

        let reply = response.json::<ChatCompletionResponse>().await?.into_reply()?;

        debug!("Received {} characters from OpenAI API", reply.len());
        Ok(reply)
    }
}
