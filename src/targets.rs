//! Target inventory and the per-target collaborator contract.
//!
//! A target is one benchmarked server implementation, living in its own
//! subdirectory of the inventory. Each directory must provide three shell
//! entry points, all executed with the target directory as working
//! directory:
//!
//! - `version.sh` — prints a single-line version string
//! - `build.sh`   — exit 0 on success, anything else is fatal for the target
//! - `run.sh`     — starts a long-lived HTTP server on the scenario port and
//!   terminates cleanly on SIGINT to itself or any of its descendants

use crate::error::BenchError;
use crate::supervise::CommandSpec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// One buildable/runnable server implementation under test.
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub dir: PathBuf,
}

impl Target {
    /// Enumerate the inventory: every subdirectory of `dir`, sorted by name.
    pub fn discover(dir: &Path) -> Result<Vec<Target>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading targets inventory {:?}", dir))?;

        let mut targets = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            targets.push(Target {
                name,
                dir: entry.path(),
            });
        }
        targets.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "discovered {} target(s) in {:?}",
            targets.len(),
            dir
        );
        Ok(targets)
    }

    /// Single-line version string from `version.sh`.
    pub async fn version(&self) -> Result<String> {
        let output = Command::new("sh")
            .arg("version.sh")
            .current_dir(&self.dir)
            .output()
            .await
            .with_context(|| format!("running version.sh for target `{}`", self.name))?;
        if !output.status.success() {
            anyhow::bail!(
                "version.sh for target `{}` failed with {}",
                self.name,
                output.status
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run `build.sh` to completion, inheriting stdio so build progress is
    /// visible. Nonzero exit is a [`BenchError::Build`].
    pub async fn build(&self) -> Result<()> {
        let status = Command::new("sh")
            .arg("build.sh")
            .current_dir(&self.dir)
            .status()
            .await
            .with_context(|| format!("running build.sh for target `{}`", self.name))?;
        if !status.success() {
            return Err(BenchError::Build {
                target: self.name.clone(),
                status,
            }
            .into());
        }
        Ok(())
    }

    /// Command spec launching this target's server, optionally pinned.
    pub fn run_command(&self, cpu_set: Option<&str>) -> CommandSpec {
        CommandSpec::new("sh", &["run.sh"])
            .current_dir(&self.dir)
            .cpu_set(cpu_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inventory(names: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in names {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn discover_sorts_and_skips_plain_files() {
        let dir = inventory(&["hyper", "actix-web", "seastar-httpd"]);
        fs::write(dir.path().join("README.md"), "not a target").unwrap();

        let targets = Target::discover(dir.path()).unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["actix-web", "hyper", "seastar-httpd"]);
    }

    #[test]
    fn discover_missing_inventory_fails() {
        assert!(Target::discover(Path::new("/nonexistent/targets")).is_err());
    }

    #[tokio::test]
    async fn version_trims_script_output() {
        let dir = inventory(&["echo-server"]);
        let target_dir = dir.path().join("echo-server");
        fs::write(target_dir.join("version.sh"), "echo '1.0.0'\n").unwrap();

        let target = Target {
            name: "echo-server".to_string(),
            dir: target_dir,
        };
        assert_eq!(target.version().await.unwrap(), "1.0.0");
    }

    #[tokio::test]
    async fn failing_build_is_a_build_error() {
        let dir = inventory(&["broken"]);
        let target_dir = dir.path().join("broken");
        fs::write(target_dir.join("build.sh"), "exit 1\n").unwrap();

        let target = Target {
            name: "broken".to_string(),
            dir: target_dir,
        };
        let err = target.build().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BenchError>(),
            Some(BenchError::Build { .. })
        ));
    }
}
