//! Fan-in: fold per-backend outcomes into a single result.
//!
//! Pure and deterministic: the same outcomes and timestamp produce an
//! identical result every time. Outcome order is the dispatch order,
//! untouched.

use chrono::{DateTime, Utc};

use super::{ReviewOutcome, ReviewResult};

/// Assemble the final result from every backend's terminal outcome.
///
/// Total cost sums only the succeeded outcomes; failed and timed-out
/// outcomes carry zero cost by construction.
pub fn assemble(
    artifact: &str,
    timestamp: DateTime<Utc>,
    outcomes: Vec<ReviewOutcome>,
) -> ReviewResult {
    let total_cost_usd = outcomes
        .iter()
        .filter(|o| o.succeeded())
        .map(|o| o.cost_usd())
        .sum();

    ReviewResult {
        artifact: artifact.to_string(),
        timestamp,
        outcomes,
        total_cost_usd,
    }
}

/// Split a result's outcomes into succeeded and not-succeeded for
/// presentation, preserving relative order within each partition.
pub fn partition(result: &ReviewResult) -> (Vec<&ReviewOutcome>, Vec<&ReviewOutcome>) {
    result.outcomes.iter().partition(|o| o.succeeded())
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::council::{OutcomeStatus, TokenUsage};

    fn success(backend: &str, cost_usd: f64) -> ReviewOutcome {
        ReviewOutcome {
            backend: backend.into(),
            status: OutcomeStatus::Succeeded {
                text: format!("review from {backend}"),
                tokens: TokenUsage {
                    input: 10,
                    output: 5,
                    thinking: 0,
                },
                cost_usd,
            },
        }
    }

    fn timed_out(backend: &str) -> ReviewOutcome {
        ReviewOutcome {
            backend: backend.into(),
            status: OutcomeStatus::TimedOut,
        }
    }

    #[test]
    fn total_sums_only_successes() {
        let outcomes = vec![
            success("a", 0.001),
            timed_out("b"),
            ReviewOutcome {
                backend: "c".into(),
                status: OutcomeStatus::Failed {
                    reason: "network".into(),
                },
            },
            success("d", 0.002),
        ];
        let result = assemble("design", Utc::now(), outcomes);
        assert_eq!(result.outcomes.len(), 4);
        assert!((result.total_cost_usd - 0.003).abs() < 1e-12);
    }

    #[test]
    fn dispatch_order_preserved() {
        let outcomes = vec![timed_out("slow"), success("fast", 0.1)];
        let result = assemble("design", Utc::now(), outcomes);
        assert_eq!(result.outcomes[0].backend, "slow");
        assert_eq!(result.outcomes[1].backend, "fast");
    }

    #[test]
    fn assembly_is_idempotent() {
        let outcomes = vec![success("a", 0.001), timed_out("b")];
        let ts = Utc::now();
        let first = assemble("design", ts, outcomes.clone());
        let second = assemble("design", ts, outcomes);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn empty_outcomes_cost_nothing() {
        let result = assemble("design", Utc::now(), vec![]);
        assert!(result.outcomes.is_empty());
        assert_eq!(result.total_cost_usd, 0.0);
    }

    #[test]
    fn partition_keeps_relative_order() {
        let result = assemble(
            "design",
            Utc::now(),
            vec![success("a", 0.1), timed_out("b"), success("c", 0.2)],
        );
        let (ok, not_ok) = partition(&result);
        assert_eq!(
            ok.iter().map(|o| o.backend.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
        assert_eq!(not_ok.len(), 1);
        assert_eq!(not_ok[0].backend, "b");
    }
}
