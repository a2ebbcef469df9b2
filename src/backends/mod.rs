//! Backend adapters for external reasoning services.
//!
//! Every adapter implements [`ReviewBackend`] and never lets an error
//! escape its boundary: whatever happens on the wire becomes a terminal
//! [`ReviewOutcome`]. Deadline overruns are reported as `TimedOut`, a
//! missing credential as an immediate `Failed` with no network I/O, and
//! everything else as `Failed` with the underlying reason.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiBackend;
pub use openai::OpenAiBackend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ApiKeys, PriceTable, PromptTemplate};
use crate::council::ReviewOutcome;

/// Capability interface for one external reasoning backend.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    /// Display name used in outcomes and reports.
    fn name(&self) -> &str;

    /// Price table used for both pre-flight estimation and real cost
    /// accounting.
    fn prices(&self) -> &PriceTable;

    /// Whether the backend has a satisfied credential.
    fn available(&self) -> bool;

    /// Run one review bounded by `timeout`, measured from this call.
    ///
    /// Resolves to exactly one terminal outcome; must never panic or
    /// error past this boundary.
    async fn review(&self, context: &str, adversarial: bool, timeout: Duration) -> ReviewOutcome;
}

/// Build the full backend roster from environment credentials.
///
/// Unavailable backends are still part of the roster; the coordinator
/// filters on [`ReviewBackend::available`] before dispatch.
pub fn roster_from_env(template: &Arc<PromptTemplate>) -> Vec<Arc<dyn ReviewBackend>> {
    let keys = ApiKeys::from_env();
    vec![
        Arc::new(OpenAiBackend::new(keys.openai, Arc::clone(template))),
        Arc::new(GeminiBackend::new(keys.gemini, Arc::clone(template))),
    ]
}

/// Whether an adapter-internal error is a transport-level timeout, which
/// must surface as `TimedOut` rather than `Failed`.
pub(crate) fn is_transport_timeout(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .is_some_and(reqwest::Error::is_timeout)
}
