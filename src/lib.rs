//! # cpv-bench
//!
//! A head-to-head HTTP server benchmark orchestrator. For every target
//! implementation in the inventory it builds the target, launches it as a
//! server process, drives load against it with external generators (`wrk`,
//! `wrk2`), and records the best-of-N measured result per scenario into a
//! streaming markdown report with machine-readable JSON dumps.
//!
//! ## Architecture Overview
//!
//! The crate is organized around the process-lifecycle engine; everything
//! else is narrow I/O glue around it:
//!
//! - `supervise`: server/client subprocess lifecycle with guaranteed
//!   two-phase SIGINT teardown
//! - `bench`: best-of-N execution of one (target, scenario, taskset,
//!   variant) tuple
//! - `orchestrator`: the full cross-product loop with per-category result
//!   accumulation
//! - `probe`: HTTP readiness polling between server spawn and first trial
//! - `parse`: extraction of measurements from load-generator output and
//!   normalization onto a common unit axis
//! - `config` / `targets`: the static benchmark tables and the target
//!   inventory contract
//! - `report`: streamed markdown narrative plus aggregated JSON records
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cpv_bench::{Orchestrator, RunConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = RunConfig {
//!         targets_dir: "targets".into(),
//!         target_filter: Some("cpv-framework".to_string()),
//!         output: "/tmp/cpv-benchmark-results.md".into(),
//!         json_output: None,
//!         best_of: 3,
//!         ready_timeout: Duration::from_secs(30),
//!     };
//!     Orchestrator::new(config)?.run().await
//! }
//! ```

pub mod bench;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod parse;
pub mod probe;
pub mod report;
pub mod supervise;
pub mod targets;
pub mod utils;

pub use bench::BenchmarkExecutor;
pub use cli::Args;
pub use config::{CommandVariant, RunConfig, Scenario, Taskset};
pub use error::BenchError;
pub use orchestrator::Orchestrator;
pub use parse::ResultPattern;
pub use report::{CategoryResults, MeasurementRecord, ReportWriter};
pub use targets::Target;

/// The current version of the benchmark orchestrator, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values.
pub mod defaults {
    /// Trials per tuple; the single most favorable result is kept.
    ///
    /// Three trials absorb one-off scheduling hiccups without stretching a
    /// full run (each trial is a minute-plus of sustained load) beyond
    /// usefulness.
    pub const BEST_OF_N: usize = 3;

    /// The target benchmarked when no filter flags are given.
    pub const TARGET: &str = "cpv-framework";

    /// Inventory directory: one subdirectory per benchmark target, each
    /// carrying `version.sh`, `build.sh`, and `run.sh`.
    pub const TARGETS_DIR: &str = "targets";

    /// Default markdown report path.
    pub const OUTPUT_FILE: &str = "/tmp/cpv-benchmark-results.md";
}
