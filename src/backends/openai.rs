//! OpenAI chat-completions adapter.
//!
//! Normalizes the chat-completions usage block (including reasoning
//! tokens from `completion_tokens_details`) into the council's uniform
//! token shape, and computes real cost from actual usage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{is_transport_timeout, ReviewBackend};
use crate::config::{PriceTable, PromptTemplate};
use crate::council::{OutcomeStatus, ReviewOutcome, TokenUsage};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-5.2";
const MAX_COMPLETION_TOKENS: u32 = 4096;

pub struct OpenAiBackend {
    name: String,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    prices: PriceTable,
    template: Arc<PromptTemplate>,
    client: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(api_key: Option<String>, template: Arc<PromptTemplate>) -> Self {
        Self {
            name: "GPT-5.2".into(),
            api_key,
            model: DEFAULT_MODEL.into(),
            endpoint: DEFAULT_ENDPOINT.into(),
            prices: PriceTable::OPENAI,
            template,
            client: reqwest::Client::new(),
        }
    }

    /// Point the adapter at an alternate endpoint (stub servers in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn call(&self, api_key: &str, prompt: &str) -> anyhow::Result<(String, TokenUsage)> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_completion_tokens": MAX_COMPLETION_TOKENS,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error {status}: {body}");
        }

        let body: ChatResponse = resp.json().await?;
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let usage = body.usage.unwrap_or_default();
        let tokens = TokenUsage {
            input: usage.prompt_tokens,
            output: usage.completion_tokens,
            thinking: usage.completion_tokens_details.reasoning_tokens,
        };
        Ok((text, tokens))
    }

    fn outcome(&self, status: OutcomeStatus) -> ReviewOutcome {
        ReviewOutcome {
            backend: self.name.clone(),
            status,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    completion_tokens_details: TokenDetails,
}

#[derive(Debug, Default, Deserialize)]
struct TokenDetails {
    #[serde(default)]
    reasoning_tokens: u64,
}

#[async_trait]
impl ReviewBackend for OpenAiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn prices(&self) -> &PriceTable {
        &self.prices
    }

    fn available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn review(&self, context: &str, adversarial: bool, timeout: Duration) -> ReviewOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return self.outcome(OutcomeStatus::Failed {
                reason: "OPENAI_API_KEY not set".into(),
            });
        };

        let prompt = self.template.render(context, adversarial);
        let status = match tokio::time::timeout(timeout, self.call(api_key, &prompt)).await {
            Ok(Ok((text, tokens))) => OutcomeStatus::Succeeded {
                cost_usd: self.prices.cost(&tokens),
                text,
                tokens,
            },
            Ok(Err(e)) if is_transport_timeout(&e) => OutcomeStatus::TimedOut,
            Ok(Err(e)) => OutcomeStatus::Failed {
                reason: e.to_string(),
            },
            Err(_) => OutcomeStatus::TimedOut,
        };
        self.outcome(status)
    }
}

// ── Tests ────────────────────────────────────────────────────────
