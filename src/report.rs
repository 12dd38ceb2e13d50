//! Streaming report output.
//!
//! The report is written as the run proceeds, one flushed line at a time, so
//! an interrupted run still leaves a useful partial record on disk. Every
//! line is simultaneously echoed to stdout in green — the narrative is the
//! user-facing output, the tracing side channel is for diagnostics.
//!
//! Layout mirrors what downstream tooling expects: a dated heading, an
//! environment summary, per-target narrative sections, and closing
//! per-category JSON dumps of all measurement records.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// The persisted best result for one (target, scenario, taskset, variant)
/// tuple. Comparable only within its own scenario's unit and direction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub target: String,
    /// Composed label: `"<taskset name> / <variant name>"`.
    pub name: String,
    pub result: f64,
}

/// Per-scenario-category ordered collections of measurement records.
pub type CategoryResults = BTreeMap<String, Vec<MeasurementRecord>>;

/// Owns the report file for the whole run; acquired once, flushed per line.
pub struct ReportWriter {
    file: File,
    path: PathBuf,
}

impl ReportWriter {
    /// Create (truncate) the report and write the run header: date,
    /// environment summary, and benchmark options.
    pub fn create(path: &Path, best_of: usize) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("creating report file {:?}", path))?;
        let mut writer = Self {
            file,
            path: path.to_path_buf(),
        };

        info!("markdown will be written to: {}", writer.path.display());

        let date = chrono::Local::now().format("%Y-%m-%d");
        writer.line(&format!("# Benchmark results ({})", date))?;
        writer.line("benchmark environment: ")?;
        writer.line(&format!("- cpu model: {}", crate::utils::cpu_model()))?;
        writer.line(&format!("- cpu cores: {}", crate::utils::cpu_cores()))?;
        writer.blank()?;
        writer.line("benchmark options: ")?;
        writer.line(&format!("- best of n: {}", best_of))?;
        writer.blank()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one line to the report and echo it to stdout. Flushed
    /// immediately so a crashed run keeps everything written so far.
    pub fn line(&mut self, line: &str) -> Result<()> {
        println!("{}", line.green().bold());
        writeln!(self.file, "{}", line)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn blank(&mut self) -> Result<()> {
        println!();
        writeln!(self.file)?;
        self.file.flush()?;
        Ok(())
    }

    /// A fenced code block, used for raw load-generator output.
    pub fn code_block(&mut self, lang: &str, body: &str) -> Result<()> {
        self.line(&format!("``` {}", lang))?;
        self.line(body)?;
        self.line("```")?;
        self.blank()
    }

    /// The closing machine-parseable section: one JSON dump per scenario
    /// category, in category order.
    pub fn aggregate(&mut self, results: &CategoryResults) -> Result<()> {
        self.line("## Charts")?;
        self.blank()?;
        for (category, records) in results {
            self.line(&format!("### Chart for {}", category))?;
            self.blank()?;
            self.line("original data:")?;
            self.blank()?;
            self.code_block("json", &serde_json::to_string_pretty(records)?)?;
        }
        Ok(())
    }
}
