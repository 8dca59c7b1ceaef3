// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    // Input/Output
    pub input: Option<String>,
    pub output: Option<String>,
    pub format: Option<String>,
    pub summary: Option<String>,

    // Detection
    pub percentage: Option<f64>,
    pub run_mode: Option<String>,

    // Performance
    pub threads: Option<usize>,
    pub disable_multithreading: Option<bool>,

    // Reporting
    pub silent: Option<bool>,
    pub verbose: Option<bool>,
    pub progress_interval: Option<u64>,

    // Flags
    pub dry_run: Option<bool>,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# hgtdist.toml - Configuration file for hgtdist
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Input NEXUS file with an ALLDISTANCES block
input = "/path/to/distances.nex"

# Output file
output = "output.nex"

# Output format: nexus, tsv, json
format = "nexus"

# JSON run summary
# summary = "summary.json"

# =============================================================================
# DETECTION
# =============================================================================

# Fraction of the sibling distribution treated as anomalous (0.0-1.0)
percentage = 0.05

# Relation directions to scan: lesser, higher, both
run_mode = "both"

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of worker threads (omit for auto-detection)
# threads = 8

# Evaluate species sequentially
disable_multithreading = false

# =============================================================================
# REPORTING
# =============================================================================

# Only print severe messages
silent = false

# Also print every potential candidate
verbose = false

# Seconds between progress reports
progress_interval = 30

# =============================================================================
# FLAGS
# =============================================================================

# Load and validate the input without running detection
dry_run = false
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_config_parses() {
        let config = Config::from_toml(&Config::generate_sample()).unwrap();
        assert_eq!(config.input.as_deref(), Some("/path/to/distances.nex"));
        assert_eq!(config.percentage, Some(0.05));
        assert_eq!(config.run_mode.as_deref(), Some("both"));
        assert_eq!(config.threads, None);
        assert_eq!(config.progress_interval, Some(30));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_toml("percentag = 0.1\n").unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::from_file("/definitely/not/here.toml").is_err());
    }
}
