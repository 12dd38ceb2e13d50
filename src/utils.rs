//! Environment probing and small validation helpers.
//!
//! The report header records the CPU model and core count so results stay
//! interpretable after the fact. Model detection reads `/proc/cpuinfo`
//! directly; on platforms without procfs it degrades to `"unknown"` rather
//! than failing the run.

use anyhow::Result;

/// CPU model string from the first `model name` line of `/proc/cpuinfo`.
pub fn cpu_model() -> String {
    cpu_model_from(&std::fs::read_to_string("/proc/cpuinfo").unwrap_or_default())
}

fn cpu_model_from(cpuinfo: &str) -> String {
    cpuinfo
        .lines()
        .find(|line| line.starts_with("model name"))
        .and_then(|line| line.split_once(':'))
        .map(|(_, model)| model.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Number of logical CPU cores available to this process.
pub fn cpu_cores() -> usize {
    num_cpus::get()
}

/// Validate a `taskset -c` CPU-set descriptor: comma-separated cores or
/// `lo-hi` ranges, e.g. `"0"`, `"2,3"`, `"0-3,8"`.
pub fn validate_cpu_set(cpu_set: &str) -> Result<()> {
    if cpu_set.is_empty() {
        anyhow::bail!("CPU set cannot be empty");
    }
    for part in cpu_set.split(',') {
        match part.split_once('-') {
            None => {
                part.parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("invalid CPU number `{part}` in set `{cpu_set}`"))?;
            }
            Some((lo, hi)) => {
                let lo: u32 = lo
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid CPU range `{part}` in set `{cpu_set}`"))?;
                let hi: u32 = hi
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid CPU range `{part}` in set `{cpu_set}`"))?;
                if lo > hi {
                    anyhow::bail!("reversed CPU range `{part}` in set `{cpu_set}`");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_model_picks_first_model_name_line() {
        let cpuinfo = "\
processor\t: 0
vendor_id\t: GenuineIntel
model name\t: Intel(R) Xeon(R) CPU E5-2670 v3 @ 2.30GHz
processor\t: 1
model name\t: Intel(R) Xeon(R) CPU E5-2670 v3 @ 2.30GHz
";
        assert_eq!(
            cpu_model_from(cpuinfo),
            "Intel(R) Xeon(R) CPU E5-2670 v3 @ 2.30GHz"
        );
    }

    #[test]
    fn cpu_model_degrades_to_unknown() {
        assert_eq!(cpu_model_from(""), "unknown");
    }

    #[test]
    fn cpu_cores_is_positive() {
        assert!(cpu_cores() > 0);
    }

    #[test]
    fn cpu_set_validation() {
        assert!(validate_cpu_set("0").is_ok());
        assert!(validate_cpu_set("2,3").is_ok());
        assert!(validate_cpu_set("0-3,8").is_ok());
        assert!(validate_cpu_set("").is_err());
        assert!(validate_cpu_set("a,b").is_err());
        assert!(validate_cpu_set("3-1").is_err());
    }
}
