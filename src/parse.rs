//! Result extraction and unit normalization.
//!
//! Load generators report their headline number in whatever unit they feel
//! like: `wrk` prints a bare requests-per-second figure, `wrk2` prints
//! latency percentiles suffixed with `ms`, `us`, `ns`, or `s`. A
//! [`ResultPattern`] pulls the first match out of the raw text and scales it
//! onto a single milliseconds-equivalent axis (throughput-style bare numbers
//! pass through verbatim) so the best-of-N comparison is unit-free.

use crate::error::BenchError;
use anyhow::Result;
use regex::Regex;

/// A compiled extraction pattern for one scenario.
///
/// The regex's first capture group (or the whole match, if there is no
/// group) must cover the numeric value plus an optional time-unit suffix.
#[derive(Debug, Clone)]
pub struct ResultPattern {
    regex: Regex,
}

impl ResultPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Extract the first measurement from `output`, normalized to
    /// milliseconds-equivalent.
    ///
    /// Fails with [`BenchError::Parse`] when the pattern does not match;
    /// callers must treat that as fatal for the trial's tuple.
    pub fn extract(&self, output: &str) -> Result<f64, BenchError> {
        let captures = self.regex.captures(output).ok_or_else(|| BenchError::Parse {
            pattern: self.regex.as_str().to_string(),
            output: output.to_string(),
        })?;
        let matched = captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str())
            .unwrap_or_default();
        parse_measurement(matched).ok_or_else(|| BenchError::Parse {
            pattern: self.regex.as_str().to_string(),
            output: output.to_string(),
        })
    }
}

/// Scale a suffixed value onto the common base unit.
///
/// `ms` ×1, `us` ×1e-3, `ns` ×1e-6, bare `s` ×1e3; a plain number is taken
/// verbatim (used for non-time metrics such as requests per second).
fn parse_measurement(raw: &str) -> Option<f64> {
    let (digits, scale) = if let Some(stripped) = raw.strip_suffix("ms") {
        (stripped, 1.0)
    } else if let Some(stripped) = raw.strip_suffix("us") {
        (stripped, 1e-3)
    } else if let Some(stripped) = raw.strip_suffix("ns") {
        (stripped, 1e-6)
    } else if let Some(stripped) = raw.strip_suffix('s') {
        (stripped, 1e3)
    } else {
        (raw, 1.0)
    };
    digits.trim().parse::<f64>().ok().map(|v| v * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(pattern: &str, output: &str) -> f64 {
        ResultPattern::new(pattern).unwrap().extract(output).unwrap()
    }

    #[test]
    fn scales_time_suffixes_to_milliseconds() {
        let p = r"([\d\.]+[mun]?s)";
        assert_eq!(extract(p, "99.000% 3ms"), 3.0);
        assert_eq!(extract(p, "latency 1500us"), 1.5);
        assert_eq!(extract(p, "tail 250ns"), 0.00025);
        assert_eq!(extract(p, "worst 2s"), 2000.0);
    }

    #[test]
    fn bare_numbers_pass_through_verbatim() {
        assert_eq!(extract(r"Requests/sec:\s*([\d\.]+)", "Requests/sec: 42"), 42.0);
        assert_eq!(
            extract(r"Requests/sec:\s*([\d\.]+)", "Requests/sec: 104231.87"),
            104231.87
        );
    }

    #[test]
    fn first_match_wins() {
        let p = r"([\d\.]+ms)";
        assert_eq!(extract(p, "p50 5ms p99 9ms"), 5.0);
    }

    #[test]
    fn matches_wrk2_latency_line() {
        let output = "\
  Latency Distribution (HdrHistogram - Recorded Latency)
 50.000%    1.02ms
 99.000%    4.87ms
 99.900%   12.20ms";
        assert_eq!(extract(r"99.000%\s*([\d\.]+[mun]?s)", output), 4.87);
    }

    #[test]
    fn missing_match_is_a_parse_error() {
        let pattern = ResultPattern::new(r"Requests/sec:\s*([\d\.]+)").unwrap();
        let err = pattern.extract("wrk: unable to connect").unwrap_err();
        assert!(matches!(err, BenchError::Parse { .. }));
        assert!(err.to_string().contains("unable to connect"));
    }

    #[test]
    fn whole_match_used_when_pattern_has_no_group() {
        assert_eq!(extract(r"\d+ms", "took 7ms overall"), 7.0);
    }
}
