use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// cpv-bench - head-to-head HTTP server benchmark orchestrator
#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct Args {
    /// Benchmark only this target from the inventory
    #[clap(short, long, default_value = crate::defaults::TARGET)]
    pub target: String,

    /// Benchmark every target in the inventory (overrides --target)
    #[clap(long, default_value_t = false)]
    pub all: bool,

    /// Directory containing one subdirectory per benchmark target
    #[clap(long, default_value = crate::defaults::TARGETS_DIR)]
    pub targets_dir: PathBuf,

    /// Markdown report output path
    #[clap(short, long, default_value = crate::defaults::OUTPUT_FILE)]
    pub output: PathBuf,

    /// Optional standalone JSON file for the aggregated measurement records
    #[clap(long)]
    pub json_output: Option<PathBuf>,

    /// Number of trials per tuple; the single best result is kept
    #[clap(short, long, default_value_t = crate::defaults::BEST_OF_N)]
    pub best_of: usize,

    /// How long to wait for a freshly spawned server to answer 200
    #[clap(long, value_parser = parse_duration, default_value = "30s")]
    pub ready_timeout: Duration,
}

/// Parse duration from string (e.g. "500ms", "10s", "5m", "1h")
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Duration cannot be empty".to_string());
    }

    let (num_str, unit) = if let Some(stripped) = s.strip_suffix("ms") {
        (stripped, "ms")
    } else if let Some(stripped) = s.strip_suffix('s') {
        (stripped, "s")
    } else if let Some(stripped) = s.strip_suffix('m') {
        (stripped, "m")
    } else if let Some(stripped) = s.strip_suffix('h') {
        (stripped, "h")
    } else {
        (s, "s") // Default to seconds
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number in duration: {}", num_str))?;

    let duration = match unit {
        "ms" => Duration::from_millis(num as u64),
        "s" => Duration::from_secs(num as u64),
        "m" => Duration::from_secs((num * 60.0) as u64),
        "h" => Duration::from_secs((num * 3600.0) as u64),
        _ => return Err(format!("Invalid duration unit: {}", unit)),
    };

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));

        assert!(parse_duration("").is_err());
        assert!(parse_duration("invalid").is_err());
    }

    #[test]
    fn defaults_keep_the_single_target_filter_on() {
        let args = Args::parse_from(["cpv-bench"]);
        assert_eq!(args.target, crate::defaults::TARGET);
        assert!(!args.all);
        assert_eq!(args.best_of, crate::defaults::BEST_OF_N);
        assert_eq!(args.ready_timeout, Duration::from_secs(30));
    }

    #[test]
    fn all_flag_parses() {
        let args = Args::parse_from(["cpv-bench", "--all", "--best-of", "5"]);
        assert!(args.all);
        assert_eq!(args.best_of, 5);
    }
}
