//! Immutable configuration for the review council.
//!
//! Price tables and prompt templates are plain data handed to the
//! estimator and the backend adapters at construction time, never
//! process-wide mutable state, so tests can swap in alternate tables
//! without touching globals.

use serde::{Deserialize, Serialize};

use crate::council::TokenUsage;

// ── Pricing ──────────────────────────────────────────────────────

/// Per-million-token pricing for one backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    /// USD per million input tokens.
    pub input_per_mtok: f64,
    /// USD per million output tokens.
    pub output_per_mtok: f64,
    /// USD per million reasoning tokens (0 for backends without the concept).
    pub thinking_per_mtok: f64,
}

impl PriceTable {
    /// OpenAI pricing (Jan 2026).
    pub const OPENAI: Self = Self {
        input_per_mtok: 1.75,
        output_per_mtok: 14.0,
        thinking_per_mtok: 14.0,
    };

    /// Gemini pricing (Jan 2026). No separate reasoning-token rate.
    pub const GEMINI: Self = Self {
        input_per_mtok: 2.0,
        output_per_mtok: 12.0,
        thinking_per_mtok: 0.0,
    };

    /// Real cost of a completed call from actual usage figures.
    pub fn cost(&self, tokens: &TokenUsage) -> f64 {
        (tokens.input as f64 / 1_000_000.0) * self.input_per_mtok
            + (tokens.thinking as f64 / 1_000_000.0) * self.thinking_per_mtok
            + (tokens.output as f64 / 1_000_000.0) * self.output_per_mtok
    }
}

// ── Prompts ──────────────────────────────────────────────────────

/// Structural prompt every reviewer receives.
const BASE_PROMPT: &str = r#"You are a senior engineer reviewing a design proposal.

Your job is NOT to approve or reject. Your job is to:
1. Identify assumptions that may be wrong
2. Surface alternative approaches not considered
3. Point out blind spots or unstated dependencies
4. Answer the structured questions below

Be genuinely helpful like a peer in design review. Do not rubber-stamp.
Do not be contrarian for its own sake.

## Structured Questions

1. List 3 assumptions this design makes that could be wrong
2. What's the worst-case failure mode?
3. What would a simpler alternative look like?
4. What context would change your assessment?

## Design to Review

"#;

/// Addendum appended for the single reviewer playing devil's advocate.
const ADVERSARIAL_ADDENDUM: &str = r#"

IMPORTANT: You are the critical reviewer (devil's advocate). Your job is to find reasons
this will fail, identify overengineering, and propose simpler alternatives. Be constructively
critical. The other reviewers are looking for problems too, but you should be especially thorough."#;

/// Prompt template shared by the estimator and every backend adapter.
///
/// Keeping estimation and rendering on the same template means the
/// pre-flight token math and the prompt actually sent agree.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Base reviewer framing, prepended to the artifact text.
    pub base: String,
    /// Appended only for the adversarial reviewer.
    pub adversarial_addendum: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            base: BASE_PROMPT.into(),
            adversarial_addendum: ADVERSARIAL_ADDENDUM.into(),
        }
    }
}

impl PromptTemplate {
    /// Render the full prompt for one reviewer.
    pub fn render(&self, context: &str, adversarial: bool) -> String {
        let mut prompt = format!("{}{}", self.base, context);
        if adversarial {
            prompt.push_str(&self.adversarial_addendum);
        }
        prompt
    }
}

// ── Credentials ──────────────────────────────────────────────────

/// Backend API keys loaded from environment variables.
///
/// Availability of a backend derives entirely from the presence of its
/// key; the council never validates or stores credentials itself.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub openai: Option<String>,
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Load keys from `OPENAI_API_KEY` and `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            openai: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini: std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
