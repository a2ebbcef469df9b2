//! Review council core: data model, error taxonomy, and the dispatch
//! coordinator that fans an artifact out to every available backend.
//!
//! ## Design
//! - A [`ReviewRequest`] is built once per invocation and never mutated
//!   after dispatch starts
//! - Every dispatched backend yields exactly one [`ReviewOutcome`];
//!   nothing is ever silently dropped
//! - Only [`CouncilError`] variants abort the whole invocation, and both
//!   fire before any network activity; per-backend failures are contained
//!   in the outcome list

pub mod aggregate;
pub mod dispatch;
pub mod estimator;

pub use dispatch::{Council, ProgressEvent};
pub use estimator::CostEstimator;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default per-backend deadline in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;

/// Default cost ceiling in USD.
pub const DEFAULT_MAX_COST_USD: f64 = 4.0;

// ── Request ──────────────────────────────────────────────────────

/// One review invocation. Immutable once dispatch starts.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    /// The artifact text under review.
    pub context: String,
    /// Whether one backend should play devil's advocate.
    pub adversarial: bool,
    /// Deadline applied independently to each backend call.
    pub timeout: Duration,
    /// Abort before dispatch if the pre-flight estimate exceeds this.
    pub max_cost_usd: f64,
    /// Label for the artifact in the rendered result.
    pub artifact: String,
}

impl ReviewRequest {
    /// Request with default timeout, ceiling, and artifact label.
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            adversarial: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_cost_usd: DEFAULT_MAX_COST_USD,
            artifact: "design".into(),
        }
    }
}

// ── Outcomes ─────────────────────────────────────────────────────

/// Token usage normalized across backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens consumed.
    pub input: u64,
    /// Completion tokens produced.
    pub output: u64,
    /// Reasoning tokens; zero for backends without the concept.
    pub thinking: u64,
}

/// Terminal state of one backend's review attempt. Exactly one state per
/// outcome; a failed call never carries a text payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// The backend returned a review.
    Succeeded {
        text: String,
        tokens: TokenUsage,
        cost_usd: f64,
    },
    /// The call errored (bad credential, transport error, malformed response).
    Failed { reason: String },
    /// The call exceeded its deadline and was cancelled.
    TimedOut,
}

/// One backend's terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// Backend that produced this outcome.
    pub backend: String,
    pub status: OutcomeStatus,
}

impl ReviewOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    /// Real cost of this outcome; non-successes carry zero by construction
    /// since no billable work completed.
    pub fn cost_usd(&self) -> f64 {
        match &self.status {
            OutcomeStatus::Succeeded { cost_usd, .. } => *cost_usd,
            _ => 0.0,
        }
    }
}

// ── Result ───────────────────────────────────────────────────────

/// Aggregated result of one council invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    /// Artifact label for presentation.
    pub artifact: String,
    /// When the result was assembled.
    pub timestamp: DateTime<Utc>,
    /// One outcome per dispatched backend, in dispatch order.
    pub outcomes: Vec<ReviewOutcome>,
    /// Sum of succeeded outcomes' real costs.
    pub total_cost_usd: f64,
}

// ── Errors ───────────────────────────────────────────────────────

/// Failures that abort the whole invocation. Both fire before any
/// backend is contacted; everything after dispatch is contained in the
/// per-backend outcomes instead.
#[derive(Debug, Error)]
pub enum CouncilError {
    /// Pre-flight estimate exceeds the configured ceiling.
    #[error("estimated cost ${estimated:.2} exceeds cost ceiling ${ceiling:.2}")]
    AdmissionDenied { estimated: f64, ceiling: f64 },

    /// Zero backends have a satisfied credential.
    #[error("no review backends available (set OPENAI_API_KEY and/or GEMINI_API_KEY)")]
    NoBackendsAvailable,
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_success_outcomes_cost_zero() {
        let failed = ReviewOutcome {
            backend: "a".into(),
            status: OutcomeStatus::Failed {
                reason: "boom".into(),
            },
        };
        let timed_out = ReviewOutcome {
            backend: "b".into(),
            status: OutcomeStatus::TimedOut,
        };
        assert_eq!(failed.cost_usd(), 0.0);
        assert_eq!(timed_out.cost_usd(), 0.0);
        assert!(!failed.succeeded());
        assert!(!timed_out.succeeded());
    }

    #[test]
    fn succeeded_outcome_carries_its_cost() {
        let outcome = ReviewOutcome {
            backend: "a".into(),
            status: OutcomeStatus::Succeeded {
                text: "ok".into(),
                tokens: TokenUsage::default(),
                cost_usd: 0.125,
            },
        };
        assert!(outcome.succeeded());
        assert_eq!(outcome.cost_usd(), 0.125);
    }

    #[test]
    fn outcome_status_serializes_with_state_tag() {
        let json = serde_json::to_value(OutcomeStatus::TimedOut).unwrap();
        assert_eq!(json["state"], "timed_out");
    }

    #[test]
    fn admission_denied_message_names_both_figures() {
        let err = CouncilError::AdmissionDenied {
            estimated: 5.0,
            ceiling: 0.01,
        };
        let msg = err.to_string();
        assert!(msg.contains("$5.00"));
        assert!(msg.contains("$0.01"));
    }
}
