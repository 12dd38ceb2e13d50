//! The run orchestrator: full cross-product iteration and result
//! accumulation.
//!
//! Iterates targets × scenarios × tasksets × command variants, driving the
//! benchmark executor for each tuple and streaming the narrative as it
//! goes. Failure scope follows the taxonomy: a build failure abandons that
//! target (no server is ever spawned for it), a readiness timeout or parse
//! failure abandons only that tuple, and the run's final status is nonzero
//! if anything failed along the way — with every failed step named.

use crate::{
    bench::BenchmarkExecutor,
    config::{self, RunConfig, Scenario, Taskset},
    report::{CategoryResults, ReportWriter},
    targets::Target,
};
use anyhow::{Context, Result};
use tracing::{error, info};

pub struct Orchestrator {
    config: RunConfig,
    scenarios: Vec<Scenario>,
    tasksets: Vec<Taskset>,
    results: CategoryResults,
}

impl Orchestrator {
    /// Orchestrator over the built-in scenario and taskset tables.
    pub fn new(config: RunConfig) -> Result<Self> {
        let scenarios = config::scenarios()?;
        let tasksets = config::tasksets()?;
        Ok(Self::with_tables(config, scenarios, tasksets))
    }

    /// Orchestrator over explicit tables, for bespoke suites and tests.
    pub fn with_tables(
        config: RunConfig,
        scenarios: Vec<Scenario>,
        tasksets: Vec<Taskset>,
    ) -> Self {
        Self {
            config,
            scenarios,
            tasksets,
            results: CategoryResults::new(),
        }
    }

    /// Accumulated measurement records, keyed by scenario category.
    pub fn results(&self) -> &CategoryResults {
        &self.results
    }

    /// Execute the whole run. The report on disk is complete up to the
    /// moment this returns, even on error.
    pub async fn run(&mut self) -> Result<()> {
        let executor = BenchmarkExecutor::new(self.config.best_of, self.config.ready_timeout)?;
        let mut report = ReportWriter::create(&self.config.output, self.config.best_of)?;

        let targets = Target::discover(&self.config.targets_dir)?;
        if let Some(filter) = &self.config.target_filter {
            if !targets.iter().any(|t| &t.name == filter) {
                anyhow::bail!(
                    "target `{}` not found in {:?}",
                    filter,
                    self.config.targets_dir
                );
            }
        }

        let scenarios = self.scenarios.clone();
        let tasksets = self.tasksets.clone();
        let mut failures: Vec<String> = Vec::new();

        report.line("## Benchmark outputs")?;
        report.blank()?;

        for target in &targets {
            if let Some(filter) = &self.config.target_filter {
                if &target.name != filter {
                    continue;
                }
            }

            if let Err(err) = self
                .bench_target(&executor, &mut report, target, &scenarios, &tasksets, &mut failures)
                .await
            {
                // Version or build failure: nothing was spawned, no
                // scenarios are attempted, later targets still run.
                error!("target {} aborted: {:#}", target.name, err);
                failures.push(format!("{}: {:#}", target.name, err));
            }
        }

        report.aggregate(&self.results)?;

        if let Some(json_path) = &self.config.json_output {
            std::fs::write(json_path, serde_json::to_string_pretty(&self.results)?)
                .with_context(|| format!("writing JSON aggregate {:?}", json_path))?;
            info!("JSON aggregate written to: {}", json_path.display());
        }

        info!("report written to: {}", report.path().display());

        if !failures.is_empty() {
            anyhow::bail!(
                "{} benchmark step(s) failed:\n  {}",
                failures.len(),
                failures.join("\n  ")
            );
        }
        Ok(())
    }

    /// Version, build, then every scenario × taskset × variant tuple for
    /// one target. Tuple failures are recorded and the loop continues.
    async fn bench_target(
        &mut self,
        executor: &BenchmarkExecutor,
        report: &mut ReportWriter,
        target: &Target,
        scenarios: &[Scenario],
        tasksets: &[Taskset],
        failures: &mut Vec<String>,
    ) -> Result<()> {
        report.line(&format!("### {} ", target.name))?;
        report.blank()?;
        report.line(&format!("version: {}", target.version().await?))?;
        report.blank()?;

        target.build().await?;

        for scenario in scenarios {
            for taskset in tasksets {
                for variant in &scenario.variants {
                    match executor
                        .execute(report, target, scenario, taskset, variant)
                        .await
                    {
                        Ok(record) => {
                            self.results
                                .entry(scenario.category.clone())
                                .or_default()
                                .push(record);
                        }
                        Err(err) => {
                            let label = format!(
                                "{} / {} / {} / {}",
                                target.name, scenario.category, taskset.name, variant.name
                            );
                            error!("tuple {} failed: {:#}", label, err);
                            failures.push(format!("{}: {:#}", label, err));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
