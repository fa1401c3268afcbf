//! Content generation collaborator.
//!
//! A [`ContentGenerator`] receives the compacted main-content HTML and the
//! page's canonical URL and returns markup expected to hold one simplified
//! `<main>` block. The output is not trusted: it goes through
//! [`crate::normalize_replacement`] before splicing.

#[cfg(feature = "fetch")]
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[cfg(feature = "fetch")]
use crate::PlainpageError;
use crate::Result;

/// Instructions sent with every page.
pub const SYSTEM_PROMPT: &str = "You rewrite the main content of web pages for readers who need \
simplified, accessible pages. Keep every fact, figure, and link target. Use plain language, short \
sentences, descriptive headings, and lists where they help. Preserve anchor hrefs exactly. Start \
with a short summary in <section class=\"a11y-summary\">. Reply with a single \
<main class=\"a11y-page\" role=\"main\"> element and nothing else.";

/// Input handed to a generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptInput {
    /// Compacted main-content HTML.
    pub html: String,
    /// Canonical URL of the page, if known.
    pub canonical_url: Option<String>,
}

impl PromptInput {
    /// The user message for the model.
    pub fn user_message(&self) -> String {
        match &self.canonical_url {
            Some(url) => format!("Page URL: {url}\n\nMain content HTML:\n{}", self.html),
            None => format!("Main content HTML:\n{}", self.html),
        }
    }
}

/// Produces a simplified main-content block.
pub trait ContentGenerator {
    /// Returns the raw model output.
    fn generate(&self, input: &PromptInput) -> impl Future<Output = Result<String>> + Send;
}

/// Settings for [`ChatCompletionsGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model name.
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: 4096,
            timeout: 120,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn chat_request<'a>(config: &'a GeneratorConfig, input: &PromptInput) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        temperature: 0.2,
        messages: vec![
            ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
            ChatMessage { role: "user".to_string(), content: input.user_message() },
        ],
    }
}

fn first_choice(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
}

/// Generator backed by an OpenAI-compatible chat-completions endpoint.
#[cfg(feature = "fetch")]
#[derive(Debug, Clone)]
pub struct ChatCompletionsGenerator {
    client: reqwest::Client,
    config: GeneratorConfig,
}

#[cfg(feature = "fetch")]
impl ChatCompletionsGenerator {
    /// Builds the HTTP client with the configured timeout.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint).map_err(|e| PlainpageError::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(PlainpageError::HttpError)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

#[cfg(feature = "fetch")]
impl ContentGenerator for ChatCompletionsGenerator {
    async fn generate(&self, input: &PromptInput) -> Result<String> {
        let mut request = self.client.post(&self.config.endpoint).json(&chat_request(&self.config, input));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PlainpageError::Timeout { timeout: self.config.timeout }
            } else {
                PlainpageError::HttpError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(200).collect();
            return Err(PlainpageError::Generator(format!("endpoint returned {status}: {excerpt}")));
        }

        let parsed: ChatResponse = response.json().await?;
        first_choice(parsed).ok_or_else(|| PlainpageError::Generator("response contained no content".to_string()))
    }
}
