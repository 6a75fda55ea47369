//! LLM summaries for the web front-end
//!
//! Calls an OpenAI-compatible chat-completions endpoint, one episode at a
//! time.

use crate::config::LlmConfig;
use crate::error::{AppError, AppResult};
use crate::models::Episode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that summarizes podcast episodes.";
pub const FALLBACK_SUMMARY: &str = "Unable to process with AI at this time.";

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Whether an API key is available at all
    fn is_configured(&self) -> bool;

    async fn summarize(&self, description: &str) -> AppResult<String>;
}

pub fn summary_prompt(description: &str) -> String {
    format!(
        "Please provide a brief summary and key insights from this podcast episode: {}",
        description
    )
}

/// Fill in `ai_summary` for every episode, sequentially. A failed call
/// leaves the fixed fallback text instead.
pub async fn attach_summaries(summarizer: &dyn Summarizer, episodes: &mut [Episode]) {
    for ep in episodes.iter_mut() {
        log::debug!("Summarizing episode: {}", ep.title);
        let summary = match summarizer.summarize(&ep.description).await {
            Ok(text) => text,
            Err(e) => {
                log::error!("Error summarizing '{}': {}", ep.title, e);
                FALLBACK_SUMMARY.to_string()
            }
        };
        ep.ai_summary = Some(summary);
    }
}

/// Chat-completions client
pub struct OpenAiClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Self {
        if api_key.is_none() {
            log::error!("OpenAI API key not found!");
        } else {
            log::debug!("OpenAI API key loaded successfully");
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            config,
            api_key,
        }
    }

    fn build_request(&self, description: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: summary_prompt(description),
                },
            ],
            max_tokens: self.config.max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiClient {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn summarize(&self, description: &str) -> AppResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("OpenAI API key not configured".to_string()))?;

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let request = self.build_request(description);

        log::info!(
            "Sending request to LLM: model={}, prompt_len={}",
            request.model,
            description.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to call LLM: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Llm(format!("LLM returned {}: {}", status, body)));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        first_choice(result)
    }
}

fn first_choice(response: ChatResponse) -> AppResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Llm("LLM returned no content".to_string()))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes a canned summary, or fails descriptions containing `fail_on`.
    pub struct StubSummarizer {
        pub configured: bool,
        pub fail_on: Option<String>,
        pub calls: AtomicUsize,
    }

    impl StubSummarizer {
        pub fn new() -> Self {
            Self {
                configured: true,
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn summarize(&self, description: &str) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.fail_on {
                Some(marker) if description.contains(marker.as_str()) => {
                    Err(AppError::Llm("rate limited".to_string()))
                }
                _ => Ok(format!("Summary of: {}", description)),
            }
        }
    }
}
