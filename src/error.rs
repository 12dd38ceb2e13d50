//! Failure taxonomy for a benchmark run.
//!
//! Everything that can abort a target or a single benchmark tuple is a
//! `BenchError`; incidental I/O failures stay as plain `anyhow` errors at the
//! call site. Teardown signal-delivery problems are deliberately *not* part of
//! this enum: a signal that misses an already-exited process is logged as a
//! warning and never escalated.

use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// The target's build procedure exited nonzero. Fatal for the target:
    /// no scenarios are attempted against an unbuilt server.
    #[error("build for target `{target}` failed with {status}")]
    Build { target: String, status: ExitStatus },

    /// The server never answered 200 within the readiness deadline. Fatal
    /// for the tuple; teardown has already run when this propagates.
    #[error("server at {url} not ready within {timeout:?}")]
    ReadinessTimeout { url: String, timeout: Duration },

    /// A client trial produced output the scenario's extraction pattern
    /// does not match. Fatal for the tuple, never silently skipped.
    #[error("no measurement matching `{pattern}` in client output:\n{output}")]
    Parse { pattern: String, output: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_timeout_names_url_and_deadline() {
        let err = BenchError::ReadinessTimeout {
            url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(30),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://127.0.0.1:8000"));
        assert!(msg.contains("30s"));
    }

    #[test]
    fn parse_error_carries_offending_output() {
        let err = BenchError::Parse {
            pattern: r"Requests/sec:\s*([\d.]+)".to_string(),
            output: "wrk: connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
