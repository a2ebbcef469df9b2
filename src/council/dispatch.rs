//! Dispatch coordination: admission control, adversary selection, and
//! the parallel fan-out/fan-in over backend adapters.
//!
//! All backends launch together and each settles on its own timeline,
//! bounded by its own deadline. The coordinator always waits for the
//! full set; there is no earliest-completion short-circuit, because cost
//! accounting needs every outcome.

use std::sync::Arc;

use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use super::aggregate;
use super::estimator::CostEstimator;
use super::{CouncilError, ReviewOutcome, ReviewRequest, ReviewResult};
use crate::backends::ReviewBackend;
use crate::config::PromptTemplate;

// ── Progress side channel ────────────────────────────────────────

/// Cosmetic progress signal emitted while backends are in flight.
///
/// Purely informational: dropping the receiver never affects dispatch,
/// and send errors are ignored.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A backend call was launched.
    Dispatched { backend: String },
    /// A backend reached its terminal outcome.
    Settled { backend: String, succeeded: bool },
}

// ── Coordinator ──────────────────────────────────────────────────

/// The dispatch coordinator.
///
/// Owns the backend roster, the shared prompt template, the pre-flight
/// estimator, and the adversary-selection RNG.
pub struct Council {
    backends: Vec<Arc<dyn ReviewBackend>>,
    template: Arc<PromptTemplate>,
    estimator: CostEstimator,
    progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    rng: StdRng,
}

impl Council {
    pub fn new(backends: Vec<Arc<dyn ReviewBackend>>, template: Arc<PromptTemplate>) -> Self {
        Self {
            backends,
            template,
            estimator: CostEstimator::default(),
            progress: None,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Fix the adversary-selection RNG seed (deterministic tests).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Attach a progress side channel.
    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// Run one council invocation to completion.
    ///
    /// Fails fast with [`CouncilError::NoBackendsAvailable`] or
    /// [`CouncilError::AdmissionDenied`] before any network activity;
    /// after dispatch, every per-backend failure is contained in the
    /// returned outcome list.
    pub async fn run(&mut self, request: &ReviewRequest) -> Result<ReviewResult, CouncilError> {
        let available: Vec<Arc<dyn ReviewBackend>> = self
            .backends
            .iter()
            .filter(|b| b.available())
            .cloned()
            .collect();
        if available.is_empty() {
            return Err(CouncilError::NoBackendsAvailable);
        }

        // Hard admission gate: checked once, before dispatch. The estimate
        // uses the same template the adapters will render.
        let prompt_tokens =
            CostEstimator::approx_tokens(&self.template.render(&request.context, false));
        let estimated: f64 = available
            .iter()
            .map(|b| self.estimator.estimate(prompt_tokens, b.prices()))
            .sum();
        tracing::info!(
            prompt_tokens,
            estimated_usd = estimated,
            reviewers = available.len(),
            "Pre-flight cost estimate"
        );
        if estimated > request.max_cost_usd {
            return Err(CouncilError::AdmissionDenied {
                estimated,
                ceiling: request.max_cost_usd,
            });
        }

        // The adversary is fixed before any concurrency begins.
        let adversary = request
            .adversarial
            .then(|| self.rng.random_range(0..available.len()));
        if let Some(idx) = adversary {
            tracing::info!(backend = available[idx].name(), "Assigned adversarial role");
        }

        let futures = available.iter().enumerate().map(|(idx, backend)| {
            let backend = Arc::clone(backend);
            let progress = self.progress.clone();
            let context = request.context.clone();
            let adversarial = adversary == Some(idx);
            let timeout = request.timeout;
            async move {
                if let Some(tx) = &progress {
                    let _ = tx.send(ProgressEvent::Dispatched {
                        backend: backend.name().to_string(),
                    });
                }
                let outcome = backend.review(&context, adversarial, timeout).await;
                tracing::info!(
                    backend = %outcome.backend,
                    succeeded = outcome.succeeded(),
                    cost_usd = outcome.cost_usd(),
                    "Backend settled"
                );
                if let Some(tx) = &progress {
                    let _ = tx.send(ProgressEvent::Settled {
                        backend: outcome.backend.clone(),
                        succeeded: outcome.succeeded(),
                    });
                }
                outcome
            }
        });

        // join_all preserves dispatch order and never short-circuits.
        let outcomes: Vec<ReviewOutcome> = join_all(futures).await;

        Ok(aggregate::assemble(
            &request.artifact,
            chrono::Utc::now(),
            outcomes,
        ))
    }
}

// ── Tests ────────────────────────────────────────────────────────
