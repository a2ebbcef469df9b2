//! Markdown rendering and persistence of a council result.
//!
//! Presentation only: reads a [`ReviewResult`], never mutates it.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::council::{aggregate, OutcomeStatus, ReviewOutcome, ReviewResult};

/// Render the full council report as markdown.
pub fn render_markdown(result: &ReviewResult) -> String {
    let (succeeded, failed) = aggregate::partition(result);

    let mut md = format!("# Council Review: {}\n\n", result.artifact);
    md.push_str(&format!("**Date**: {}\n", result.timestamp.to_rfc3339()));
    md.push_str(&format!("**Reviewers**: {}", names(&succeeded)));
    if !failed.is_empty() {
        md.push_str(&format!(" (failed: {})", names(&failed)));
    }
    md.push_str(&format!("\n**Cost**: ${:.2}\n\n", result.total_cost_usd));

    md.push_str(&format!(
        "## Summary\n\nReview completed with {}/{} reviewers.\n\n---\n\n",
        succeeded.len(),
        result.outcomes.len()
    ));

    for outcome in &succeeded {
        if let OutcomeStatus::Succeeded {
            text,
            tokens,
            cost_usd,
        } = &outcome.status
        {
            md.push_str(&format!("## {}\n\n", outcome.backend));
            md.push_str(&format!(
                "*Tokens: {} in, {} out",
                tokens.input, tokens.output
            ));
            if tokens.thinking > 0 {
                md.push_str(&format!(", {} thinking", tokens.thinking));
            }
            md.push_str(&format!(" | Cost: ${cost_usd:.3}*\n\n"));
            md.push_str(text);
            md.push_str("\n\n");
        }
    }

    for outcome in &failed {
        md.push_str(&format!("## {} (FAILED)\n\n", outcome.backend));
        match &outcome.status {
            OutcomeStatus::TimedOut => md.push_str("*Timed out*\n\n"),
            OutcomeStatus::Failed { reason } => md.push_str(&format!("*Error: {reason}*\n\n")),
            OutcomeStatus::Succeeded { .. } => {}
        }
    }

    md
}

/// Filesystem-safe filename stem for a result's timestamp.
pub fn timestamp_slug(result: &ReviewResult) -> String {
    result
        .timestamp
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        .replace([':', '.'], "-")
}

/// Write the rendered report under `out_dir`, creating the directory if
/// needed. Returns the path of the written file.
pub async fn persist(
    result: &ReviewResult,
    markdown: &str,
    out_dir: &Path,
) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("creating results directory {}", out_dir.display()))?;
    let path = out_dir.join(format!("{}.md", timestamp_slug(result)));
    tokio::fs::write(&path, markdown)
        .await
        .with_context(|| format!("writing result to {}", path.display()))?;
    Ok(path)
}

fn names(outcomes: &[&ReviewOutcome]) -> String {
    outcomes
        .iter()
        .map(|o| o.backend.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ────────────────────────────────────────────────────────
