//! Pre-flight cost estimation.
//!
//! Deliberately coarse: prompt tokens come from a fixed chars-per-token
//! divisor, and the thinking/output allowances are flat constants
//! regardless of artifact size, so very short or very long reviews can
//! be over- or under-estimated. Good enough for a budget gate, not a
//! pricing forecast. Real cost always comes from the usage figures the
//! backend reports, never from this estimate.

use crate::config::PriceTable;

/// Rough chars-per-token divisor (1 token ≈ 4 characters).
const CHARS_PER_TOKEN: u64 = 4;

/// Flat reasoning-token allowance assumed for estimation.
const ASSUMED_THINKING_TOKENS: u64 = 15_000;

/// Flat output-token allowance assumed for estimation.
const ASSUMED_OUTPUT_TOKENS: u64 = 1_500;

/// Projects a prompt's approximate size into a per-backend cost.
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    thinking_tokens: u64,
    output_tokens: u64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            thinking_tokens: ASSUMED_THINKING_TOKENS,
            output_tokens: ASSUMED_OUTPUT_TOKENS,
        }
    }
}

impl CostEstimator {
    /// Approximate token count of a prompt from its character length.
    pub fn approx_tokens(text: &str) -> u64 {
        (text.len() as u64).div_ceil(CHARS_PER_TOKEN)
    }

    /// Projected cost of one backend call for a prompt of the given size.
    pub fn estimate(&self, prompt_tokens: u64, prices: &PriceTable) -> f64 {
        let per_mtok = 1_000_000.0;
        (prompt_tokens as f64 / per_mtok) * prices.input_per_mtok
            + (self.thinking_tokens as f64 / per_mtok) * prices.thinking_per_mtok
            + (self.output_tokens as f64 / per_mtok) * prices.output_per_mtok
    }
}

// ── Tests ────────────────────────────────────────────────────────
