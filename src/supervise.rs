//! Process supervision: typed command construction, server lifecycle, and
//! sequential client trials.
//!
//! The supervisor owns the only genuinely delicate resource in the system:
//! a long-lived server subprocess that must never outlive the benchmark
//! tuple that spawned it, no matter how the tuple ends. Teardown is
//! two-phase by design: some servers fork worker processes that do not
//! terminate when only the parent receives the signal, so every recursive
//! descendant is interrupted first, then the root, and only then does the
//! supervisor block until the root's exit status is observed.

use crate::error::BenchError;
use anyhow::{Context, Result};
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// A fully described subprocess invocation: executable, arguments, working
/// directory, and optional CPU pinning. Built as argv, never via shell
/// string interpolation.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    cpu_set: Option<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            cwd: None,
            cpu_set: None,
        }
    }

    pub fn with_args(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            cwd: None,
            cpu_set: None,
        }
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }

    /// Restrict the process to a CPU set via `taskset -c`; `None` leaves it
    /// unpinned.
    pub fn cpu_set(mut self, cpu_set: Option<&str>) -> Self {
        self.cpu_set = cpu_set.map(|s| s.to_string());
        self
    }

    fn command(&self) -> Command {
        let mut cmd = match &self.cpu_set {
            Some(set) => {
                let mut cmd = Command::new("taskset");
                cmd.arg("-c").arg(set).arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// The exact invocation as it would read on a shell prompt, for the
    /// report narrative.
    pub fn display(&self) -> String {
        let mut tokens = Vec::new();
        if let Some(set) = &self.cpu_set {
            tokens.push("taskset".to_string());
            tokens.push("-c".to_string());
            tokens.push(set.clone());
        }
        tokens.push(self.program.clone());
        tokens.extend(self.args.iter().cloned());
        tokens.join(" ")
    }
}

/// Deliver SIGINT to `pid`, ignoring processes that are already gone.
/// Any other delivery failure is logged and never escalated.
pub fn send_sigint(pid: i32) {
    match kill(Pid::from_raw(pid), Signal::SIGINT) {
        Ok(()) => {}
        Err(Errno::ESRCH) => {} // already exited
        Err(err) => warn!("failed to deliver SIGINT to pid {}: {}", pid, err),
    }
}

fn stat_ppid(stat: &str) -> Option<i32> {
    // /proc/<pid>/stat is "pid (comm) state ppid ..."; comm may itself
    // contain spaces and parentheses, so split after the last ')'.
    let (_, rest) = stat.rsplit_once(')')?;
    rest.split_whitespace().nth(1)?.parse().ok()
}

/// All recursive descendants of `root`, from a snapshot of the `/proc`
/// pid/ppid table. Children appear before their own children.
pub fn descendants(root: i32) -> Vec<i32> {
    let mut table = Vec::new();
    if let Ok(entries) = std::fs::read_dir("/proc") {
        for entry in entries.flatten() {
            let pid = match entry.file_name().to_str().and_then(|s| s.parse::<i32>().ok()) {
                Some(pid) => pid,
                None => continue,
            };
            if let Ok(stat) = std::fs::read_to_string(entry.path().join("stat")) {
                if let Some(ppid) = stat_ppid(&stat) {
                    table.push((pid, ppid));
                }
            }
        }
    }

    let mut found = Vec::new();
    let mut frontier = vec![root];
    while let Some(parent) = frontier.pop() {
        for &(pid, ppid) in &table {
            if ppid == parent && !found.contains(&pid) {
                found.push(pid);
                frontier.push(pid);
            }
        }
    }
    found
}

/// A running server subprocess whose lifetime is bounded by the enclosing
/// benchmark tuple.
///
/// The expected exit path is an explicit [`ServerProcess::shutdown`]. If
/// that is skipped (a panic mid-tuple), `Drop` re-sends the interrupt
/// sequence and the child's `kill_on_drop` reaps whatever ignored it.
pub struct ServerProcess {
    child: Child,
    done: bool,
}

impl ServerProcess {
    /// Spawn the server detached in its working directory. Readiness is the
    /// caller's concern; nothing here waits for the listener to come up.
    pub fn spawn(spec: &CommandSpec) -> Result<Self> {
        let child = spec
            .command()
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning server: {}", spec.display()))?;
        debug!("server spawned: {} (pid {:?})", spec.display(), child.id());
        Ok(Self { child, done: false })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Two-phase graceful teardown: SIGINT every descendant, then the root,
    /// then block until the root's exit status is observed.
    pub async fn shutdown(&mut self) -> Result<ExitStatus> {
        self.done = true;
        if let Some(pid) = self.child.id() {
            let pid = pid as i32;
            for child_pid in descendants(pid) {
                send_sigint(child_pid);
            }
            send_sigint(pid);
        }
        let status = self.child.wait().await.context("waiting for server exit")?;
        info!("server exited with: {}", status);
        Ok(status)
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(pid) = self.child.id() {
            let pid = pid as i32;
            for child_pid in descendants(pid) {
                send_sigint(child_pid);
            }
            send_sigint(pid);
        }
    }
}

/// Run one client trial to completion, capturing combined stdout/stderr.
pub async fn run_trial(spec: &CommandSpec) -> Result<String> {
    let output = spec
        .command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .with_context(|| format!("running client: {}", spec.display()))?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    Ok(text.trim().to_string())
}

/// Bring up the server, wait for `ready`, run `trials` sequential client
/// processes, and hand each trial's combined output to `on_output`.
///
/// Teardown runs on every exit path before any error propagates: spawn
/// failure aside, the server is signalled and reaped whether the readiness
/// probe timed out, a client failed to launch, or `on_output` rejected a
/// trial's output.
pub async fn run_supervised<R, F>(
    server: &CommandSpec,
    client: &CommandSpec,
    trials: usize,
    ready: R,
    mut on_output: F,
) -> Result<()>
where
    R: Future<Output = Result<(), BenchError>>,
    F: FnMut(usize, &str) -> Result<()>,
{
    let mut server_proc = ServerProcess::spawn(server)?;

    let outcome = async {
        ready.await?;
        for trial in 0..trials {
            let output = run_trial(client).await?;
            on_output(trial, &output)?;
        }
        Ok(())
    }
    .await;

    // Unconditional cleanup: failures above still reach this point.
    if let Err(err) = server_proc.shutdown().await {
        warn!("server teardown: {}", err);
    }

    outcome
}
