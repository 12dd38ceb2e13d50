//! Benchmark execution for a single tuple.
//!
//! One tuple is one (target, scenario, taskset, command variant)
//! combination. The executor brings the target's server up under the
//! taskset's server CPU set, waits for readiness, runs the configured
//! number of client trials under the client CPU set, parses every trial
//! through the scenario's extraction pattern, and keeps the single most
//! favorable result. There is no partial success: a trial whose output
//! cannot be parsed aborts the tuple (after teardown) rather than being
//! skipped.

use crate::{
    config::{CommandVariant, Scenario, Taskset},
    probe::{probe_client, wait_ready},
    report::{MeasurementRecord, ReportWriter},
    supervise::{run_supervised, CommandSpec},
    targets::Target,
};
use anyhow::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

/// The winning trial so far: parsed value plus the raw text it came from.
#[derive(Debug, Clone)]
struct BestTrial {
    value: f64,
    output: String,
}

/// Fold one parsed trial into the running best under the scenario's
/// comparator. Strict comparison, so ties keep the first-seen trial.
fn consider(best: &mut Option<BestTrial>, scenario: &Scenario, value: f64, output: &str) {
    let better = match best {
        None => true,
        Some(current) => scenario.is_better(value, current.value),
    };
    if better {
        *best = Some(BestTrial {
            value,
            output: output.to_string(),
        });
    }
}

/// Executes benchmark tuples; one instance serves the whole run.
pub struct BenchmarkExecutor {
    http: Client,
    best_of: usize,
    ready_timeout: Duration,
}

impl BenchmarkExecutor {
    pub fn new(best_of: usize, ready_timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: probe_client()?,
            best_of,
            ready_timeout,
        })
    }

    /// Run one tuple to completion and emit its measurement record.
    ///
    /// The server process spawned here never outlives this call: success,
    /// readiness timeout, and parse failure all pass through the
    /// supervisor's guaranteed teardown before returning.
    pub async fn execute(
        &self,
        report: &mut ReportWriter,
        target: &Target,
        scenario: &Scenario,
        taskset: &Taskset,
        variant: &CommandVariant,
    ) -> Result<MeasurementRecord> {
        report.line(&format!(
            "##### {} / {} / {}",
            target.name, taskset.name, variant.name
        ))?;
        report.blank()?;

        let server = target.run_command(taskset.server.as_deref());
        let client = CommandSpec::with_args(&variant.program, variant.args_for(&scenario.url))
            .cpu_set(taskset.client.as_deref());

        report.line(&format!("run server with: `{}`", server.display()))?;
        report.blank()?;
        report.line(&format!("run client with: `{}`", client.display()))?;
        report.blank()?;

        let mut best: Option<BestTrial> = None;
        run_supervised(
            &server,
            &client,
            self.best_of,
            wait_ready(&self.http, &scenario.url, self.ready_timeout),
            |trial, output| {
                let value = scenario.pattern.extract(output)?;
                info!("round {} result: {:.5}", trial + 1, value);
                consider(&mut best, scenario, value, output);
                Ok(())
            },
        )
        .await?;

        let best = best.ok_or_else(|| anyhow::anyhow!("no trials were executed"))?;

        report.line("output:")?;
        report.blank()?;
        report.code_block("text", &best.output)?;

        Ok(MeasurementRecord {
            target: target.name.clone(),
            name: format!("{} / {}", taskset.name, variant.name),
            result: best.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::ResultPattern;

    fn scenario(greater_is_better: bool, pattern: &str) -> Scenario {
        Scenario {
            category: "test".to_string(),
            description: String::new(),
            url: "http://127.0.0.1:8000".to_string(),
            variants: Vec::new(),
            pattern: ResultPattern::new(pattern).unwrap(),
            greater_is_better,
        }
    }

    fn fold(scenario: &Scenario, outputs: &[&str]) -> BestTrial {
        let mut best = None;
        for output in outputs {
            let value = scenario.pattern.extract(output).unwrap();
            consider(&mut best, scenario, value, output);
        }
        best.unwrap()
    }

    #[test]
    fn greater_is_better_keeps_the_maximum() {
        let scenario = scenario(true, r"Requests/sec:\s*([\d\.]+)");
        let best = fold(
            &scenario,
            &[
                "Requests/sec: 100.0",
                "Requests/sec: 150.0",
                "Requests/sec: 120.0",
            ],
        );
        assert_eq!(best.value, 150.0);
        assert_eq!(best.output, "Requests/sec: 150.0");
    }

    #[test]
    fn lower_is_better_keeps_the_minimum() {
        let scenario = scenario(false, r"99.000%\s*([\d\.]+[mun]?s)");
        let best = fold(
            &scenario,
            &["99.000% 5ms", "99.000% 3ms", "99.000% 7ms"],
        );
        assert_eq!(best.value, 3.0);
    }

    #[test]
    fn ties_retain_the_earliest_trial() {
        let scenario = scenario(true, r"Requests/sec:\s*([\d\.]+)");
        let mut best = None;
        consider(&mut best, &scenario, 100.0, "first 100");
        consider(&mut best, &scenario, 100.0, "second 100");
        let best = best.unwrap();
        assert_eq!(best.output, "first 100");
    }
}
