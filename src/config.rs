//! Run configuration and the static benchmark tables.
//!
//! The scenario and taskset tables are the authoritative description of what
//! gets measured: which URL is loaded, which load-generator invocations are
//! tried, how a result is extracted from their output, and which direction
//! counts as better. They are built once, validated, and passed into the
//! orchestrator as immutable data.

use crate::{cli::Args, parse::ResultPattern, utils::validate_cpu_set};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// One load-generator invocation template within a scenario.
///
/// Held as argv rather than a shell string; `{url}` in any argument is
/// replaced with the scenario URL when the client command is built.
#[derive(Debug, Clone)]
pub struct CommandVariant {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl CommandVariant {
    pub fn new(name: &str, program: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Argv with the scenario URL substituted for every `{url}` placeholder.
    pub fn args_for(&self, url: &str) -> Vec<String> {
        self.args.iter().map(|a| a.replace("{url}", url)).collect()
    }
}

/// A named category of measurement with its own comparator direction.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub category: String,
    pub description: String,
    pub url: String,
    pub variants: Vec<CommandVariant>,
    pub pattern: ResultPattern,
    /// `true` for throughput-style metrics, `false` for latency-style.
    pub greater_is_better: bool,
}

impl Scenario {
    /// `true` when `candidate` is strictly better than `best` under this
    /// scenario's comparator. Ties are not better, so first-seen wins.
    pub fn is_better(&self, candidate: f64, best: f64) -> bool {
        if self.greater_is_better {
            candidate > best
        } else {
            candidate < best
        }
    }
}

/// A pinning of server and client processes to CPU core sets.
///
/// `None` leaves that side unpinned. The default tables always pin; the
/// server and client sets must be disjoint so the load generator does not
/// steal cycles from the process it is measuring (caller-enforced).
#[derive(Debug, Clone)]
pub struct Taskset {
    pub name: String,
    pub server: Option<String>,
    pub client: Option<String>,
}

impl Taskset {
    pub fn new(name: &str, server: &str, client: &str) -> Self {
        Self {
            name: name.to_string(),
            server: Some(server.to_string()),
            client: Some(client.to_string()),
        }
    }

    /// An unpinned configuration, used where `taskset` is unavailable.
    pub fn unpinned(name: &str) -> Self {
        Self {
            name: name.to_string(),
            server: None,
            client: None,
        }
    }

    fn validate(&self) -> Result<()> {
        for side in [&self.server, &self.client].into_iter().flatten() {
            validate_cpu_set(side).with_context(|| format!("taskset `{}`", self.name))?;
        }
        Ok(())
    }
}

/// Immutable configuration for one benchmark run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub targets_dir: PathBuf,
    /// `None` runs every discovered target.
    pub target_filter: Option<String>,
    pub output: PathBuf,
    pub json_output: Option<PathBuf>,
    pub best_of: usize,
    pub ready_timeout: Duration,
}

impl RunConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        if args.best_of == 0 {
            anyhow::bail!("--best-of must be at least 1");
        }
        Ok(Self {
            targets_dir: args.targets_dir.clone(),
            target_filter: if args.all {
                None
            } else {
                Some(args.target.clone())
            },
            output: args.output.clone(),
            json_output: args.json_output.clone(),
            best_of: args.best_of,
            ready_timeout: args.ready_timeout,
        })
    }
}

/// The built-in scenario table: sustained throughput via `wrk` and tail
/// latency via `wrk2`, three connection-count variants each.
pub fn scenarios() -> Result<Vec<Scenario>> {
    Ok(vec![
        Scenario {
            category: "throughput".to_string(),
            description: "requests per second".to_string(),
            url: "http://127.0.0.1:8000".to_string(),
            variants: vec![
                CommandVariant::new(
                    "100 connections",
                    "wrk",
                    &["-c", "100", "-t", "2", "-d", "60s", "--latency", "--timeout", "100s", "{url}"],
                ),
                CommandVariant::new(
                    "10000 connections",
                    "wrk",
                    &["-c", "10000", "-t", "2", "-d", "120s", "--latency", "--timeout", "100s", "{url}"],
                ),
                CommandVariant::new(
                    "20000 connections",
                    "wrk",
                    &["-c", "20000", "-t", "2", "-d", "180s", "--latency", "--timeout", "100s", "{url}"],
                ),
            ],
            pattern: ResultPattern::new(r"Requests/sec:\s*([\d\.]+)")?,
            greater_is_better: true,
        },
        Scenario {
            category: "latency".to_string(),
            description: "maximum response latency of 99% of requests".to_string(),
            url: "http://127.0.0.1:8000".to_string(),
            variants: vec![
                CommandVariant::new(
                    "100 connections with 1000 rps",
                    "wrk2",
                    &["-c", "100", "-t", "2", "-d", "60s", "-R", "1000", "--latency", "--timeout", "100s", "{url}"],
                ),
                CommandVariant::new(
                    "10000 connections with 5000 rps",
                    "wrk2",
                    &["-c", "10000", "-t", "2", "-d", "120s", "-R", "5000", "--latency", "--timeout", "100s", "{url}"],
                ),
                CommandVariant::new(
                    "10000 connections with 10000 rps",
                    "wrk2",
                    &["-c", "10000", "-t", "2", "-d", "120s", "-R", "10000", "--latency", "--timeout", "100s", "{url}"],
                ),
            ],
            pattern: ResultPattern::new(r"99.000%\s*([\d\.]+[mun]?s)")?,
            greater_is_better: false,
        },
    ])
}

/// The built-in affinity table. Client cores stay fixed so only the server
/// core budget varies between configurations.
pub fn tasksets() -> Result<Vec<Taskset>> {
    let tasksets = vec![
        Taskset::new("1 core", "0", "2,3"),
        Taskset::new("2 cores", "0,1", "2,3"),
    ];
    for taskset in &tasksets {
        taskset.validate()?;
    }
    Ok(tasksets)
}
