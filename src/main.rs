//! quorum CLI: review a design artifact with a council of reasoning
//! backends running in parallel, under a cost ceiling and a per-backend
//! deadline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::AsyncReadExt;

use quorum::backends;
use quorum::config::PromptTemplate;
use quorum::council::{
    Council, ProgressEvent, ReviewRequest, DEFAULT_MAX_COST_USD, DEFAULT_TIMEOUT_SECS,
};
use quorum::report;

#[derive(Debug, Parser)]
#[command(
    name = "quorum",
    version,
    about = "Parallel multi-model design review council"
)]
struct Cli {
    /// Artifact text to review; read from stdin when omitted.
    context: Option<String>,

    /// Assign the devil's advocate role to one random reviewer.
    #[arg(long)]
    adversarial: bool,

    /// Per-backend timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Abort before dispatch if the estimated cost exceeds this (USD).
    #[arg(long, default_value_t = DEFAULT_MAX_COST_USD)]
    max_cost: f64,

    /// Name of the artifact being reviewed.
    #[arg(long, default_value = "design")]
    artifact: String,

    /// Directory for persisted review results.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let context = match cli.context {
        Some(arg) => arg,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading artifact from stdin")?;
            buf
        }
    };
    if context.trim().is_empty() {
        anyhow::bail!("no context provided: pipe the artifact via stdin or pass it as an argument");
    }

    let template = Arc::new(PromptTemplate::default());
    let roster = backends::roster_from_env(&template);

    // Lightweight stderr ticker fed by the coordinator's progress channel.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let ticker = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ProgressEvent::Dispatched { backend } => eprintln!("  {backend}: thinking..."),
                ProgressEvent::Settled { backend, succeeded } => {
                    eprintln!("  {backend}: {}", if succeeded { "done" } else { "failed" })
                }
            }
        }
    });

    let request = ReviewRequest {
        context,
        adversarial: cli.adversarial,
        timeout: Duration::from_secs(cli.timeout),
        max_cost_usd: cli.max_cost,
        artifact: cli.artifact,
    };

    let mut council = Council::new(roster, template).with_progress(tx);
    let result = council.run(&request).await?;
    drop(council); // closes the progress channel so the ticker drains
    let _ = ticker.await;

    let markdown = report::render_markdown(&result);

    let out_dir = match cli.out_dir {
        Some(dir) => dir,
        None => default_out_dir()?,
    };
    let path = report::persist(&result, &markdown, &out_dir).await?;

    tracing::info!(
        path = %path.display(),
        total_cost_usd = result.total_cost_usd,
        "Review complete"
    );

    println!("{markdown}");
    Ok(())
}

fn default_out_dir() -> anyhow::Result<PathBuf> {
    let base = directories::BaseDirs::new().context("could not resolve home directory")?;
    Ok(base.home_dir().join(".quorum").join("reviews"))
}
