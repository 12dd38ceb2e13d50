//! Binary entry point: parse arguments, assemble the run configuration,
//! and hand control to the orchestrator. A failed run — build error or any
//! failed tuple — exits nonzero with the failing steps named; whatever part
//! of the report was already written stays on disk.

use anyhow::Result;
use clap::Parser;
use cpv_bench::{logging::DiagnosticFormatter, Args, Orchestrator, RunConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Narrative output goes through the report writer; tracing carries the
    // diagnostic side channel, defaulting to info unless RUST_LOG says
    // otherwise.
    tracing_subscriber::fmt()
        .event_format(DiagnosticFormatter)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = RunConfig::from_args(&args)?;

    info!("starting benchmark run: {:?}", config);

    Orchestrator::new(config)?.run().await
}
