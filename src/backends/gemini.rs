//! Gemini `generateContent` adapter.
//!
//! Normalizes `usageMetadata` (prompt/candidates/thoughts token counts)
//! into the council's uniform token shape. Gemini has no separate
//! reasoning-token rate, so thoughts tokens are recorded but priced at
//! zero by the default table.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{is_transport_timeout, ReviewBackend};
use crate::config::{PriceTable, PromptTemplate};
use crate::council::{OutcomeStatus, ReviewOutcome, TokenUsage};

const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
const MAX_OUTPUT_TOKENS: u32 = 4096;

pub struct GeminiBackend {
    name: String,
    api_key: Option<String>,
    endpoint: String,
    prices: PriceTable,
    template: Arc<PromptTemplate>,
    client: reqwest::Client,
}

impl GeminiBackend {
    pub fn new(api_key: Option<String>, template: Arc<PromptTemplate>) -> Self {
        Self {
            name: "Gemini 3 Pro".into(),
            api_key,
            endpoint: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                DEFAULT_MODEL
            ),
            prices: PriceTable::GEMINI,
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
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "maxOutputTokens": MAX_OUTPUT_TOKENS },
        });

        let url = format!("{}?key={}", self.endpoint, api_key);
        let resp = self.client.post(&url).json(&payload).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {status}: {body}");
        }

        let body: GenerateResponse = resp.json().await?;
        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();
        let usage = body.usage_metadata.unwrap_or_default();
        let tokens = TokenUsage {
            input: usage.prompt_token_count,
            output: usage.candidates_token_count,
            thinking: usage.thoughts_token_count,
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
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    thoughts_token_count: u64,
}

#[async_trait]
impl ReviewBackend for GeminiBackend {
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
                reason: "GEMINI_API_KEY not set".into(),
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

#[cfg(test)]
mod tests {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn backend(api_key: Option<&str>) -> GeminiBackend {
        GeminiBackend::new(
            api_key.map(String::from),
            Arc::new(PromptTemplate::default()),
        )
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn missing_key_fails_without_network_io() {
        let backend = backend(None);
        assert!(!backend.available());

        let outcome = backend.review("design", false, TIMEOUT).await;
        match outcome.status {
            OutcomeStatus::Failed { reason } => assert_eq!(reason, "GEMINI_API_KEY not set"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_normalizes_usage_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "the simpler alternative is a queue" }] }
                }],
                "usageMetadata": {
                    "promptTokenCount": 200,
                    "candidatesTokenCount": 40,
                    "thoughtsTokenCount": 30
                }
            })))
            .mount(&server)
            .await;

        let backend = backend(Some("test-key")).with_endpoint(server.uri());
        let outcome = backend.review("design", true, TIMEOUT).await;

        match outcome.status {
            OutcomeStatus::Succeeded {
                text,
                tokens,
                cost_usd,
            } => {
                assert_eq!(text, "the simpler alternative is a queue");
                assert_eq!(
                    tokens,
                    TokenUsage {
                        input: 200,
                        output: 40,
                        thinking: 30
                    }
                );
                // Thoughts tokens are recorded but priced at zero.
                let expected = (200.0 * 2.0 + 40.0 * 12.0) / 1_000_000.0;
                assert!((cost_usd - expected).abs() < 1e-12);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn api_error_becomes_failed_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let backend = backend(Some("test-key")).with_endpoint(server.uri());
        let outcome = backend.review("design", false, TIMEOUT).await;

        match outcome.status {
            OutcomeStatus::Failed { reason } => {
                assert!(reason.contains("Gemini API error"));
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_overrun_is_timed_out_not_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "candidates": [] }))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let backend = backend(Some("test-key")).with_endpoint(server.uri());
        let outcome = backend
            .review("design", false, Duration::from_millis(100))
            .await;
        assert!(matches!(outcome.status, OutcomeStatus::TimedOut));
    }
}
