//! quorum — parallel multi-model design review council.
//!
//! Fans a design artifact out to several external reasoning backends at
//! once, bounded by a cost ceiling and a per-backend deadline, and folds
//! every outcome (success, failure, or timeout) into a single result.
//!
//! ## Design
//! - Trait-driven backend adapters ([`backends::ReviewBackend`]) that
//!   never let an error escape their boundary
//! - Hard pre-flight admission gate against a cost ceiling, before any
//!   network activity
//! - Parallel fan-out with an independent deadline per backend; one
//!   backend's failure never cancels or delays its siblings
//! - Pure, deterministic fan-in preserving dispatch order

pub mod backends;
pub mod config;
pub mod council;
pub mod report;

pub use backends::ReviewBackend;
pub use council::{
    Council, CouncilError, OutcomeStatus, ProgressEvent, ReviewOutcome, ReviewRequest,
    ReviewResult, TokenUsage,
};
