//! Readiness probing for freshly spawned servers.
//!
//! A server is ready once a plain GET against the scenario URL comes back
//! with status 200. Until then every failure mode looks the same from here:
//! connection refused while the listener is still binding, 5xx while routes
//! warm up, or a transport error from a half-open socket. All of them are
//! swallowed and retried until the deadline.

use crate::error::BenchError;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

/// Cap on a single probe attempt, so one hung request cannot overshoot the
/// readiness deadline by more than a round trip.
pub const PROBE_REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll `url` until it answers 200 or `timeout` of wall-clock time elapses.
///
/// Retries at full rate, bounded only by network round-trip time; the server
/// being probed is the only consumer of these requests, so there is no reason
/// to back off. Must be called after the server process has been spawned and
/// before the first client trial is launched.
pub async fn wait_ready(client: &Client, url: &str, timeout: Duration) -> Result<(), BenchError> {
    let begin = Instant::now();
    let mut attempts: u64 = 0;

    loop {
        attempts += 1;
        match client.get(url).send().await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => {
                debug!(
                    "{} ready after {:?} ({} attempt(s))",
                    url,
                    begin.elapsed(),
                    attempts
                );
                return Ok(());
            }
            Ok(response) => {
                debug!("{} returned {} while warming up", url, response.status());
            }
            Err(_) => {}
        }

        if begin.elapsed() > timeout {
            return Err(BenchError::ReadinessTimeout {
                url: url.to_string(),
                timeout,
            });
        }
    }
}

/// HTTP client configured for probing: short per-request timeout, no pooling
/// assumptions about the server under test surviving between tuples.
pub fn probe_client() -> reqwest::Result<Client> {
    Client::builder()
        .timeout(PROBE_REQUEST_TIMEOUT)
        .pool_max_idle_per_host(0)
        .build()
}
