// validation.rs - Input validation utilities

use crate::cli::args::Args;
use crate::core::{EngineConfig, RunMode};
use crate::output::OutputFormat;
use crate::reporting::Verbosity;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default output path when neither CLI nor config names one
pub const DEFAULT_OUTPUT: &str = "output.nex";

pub struct ValidationResult {
    pub input: String,
    pub output: String,
    pub engine: EngineConfig,
    pub output_format: OutputFormat,
    pub verbosity: Verbosity,
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let input = args.input.clone().ok_or("--input is required")?;
    if !Path::new(&input).exists() {
        return Err(format!("Couldn't find file {}", input));
    }

    if !args.percentage.is_finite() || args.percentage < 0.0 || args.percentage > 1.0 {
        return Err("Percentage must be between 0.0 and 1.0".to_string());
    }

    if args.silent && args.verbose {
        return Err("--silent and --verbose cannot be used together".to_string());
    }
    let verbosity = if args.silent {
        Verbosity::Silent
    } else if args.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    if args.threads == Some(0) {
        return Err("--threads must be at least 1".to_string());
    }
    if args.disable_multithreading && args.threads.is_some() {
        return Err("--threads is not compatible with --disable-multithreading".to_string());
    }

    if args.progress_interval == 0 {
        return Err("--progress-interval must be at least 1 second".to_string());
    }

    let run_mode = RunMode::from_str(&args.run_mode)?;
    let output_format = OutputFormat::from_str(&args.format)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    if output == input {
        return Err(format!("Output file '{}' would overwrite the input", output));
    }

    Ok(ValidationResult {
        input,
        output,
        engine: EngineConfig {
            percentage: args.percentage,
            run_mode,
            multithreading: !args.disable_multithreading,
            threads: args.threads,
            progress_interval: Duration::from_secs(args.progress_interval),
        },
        output_format,
        verbosity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    /// Any file that exists works as input for argument validation
    const EXISTING: &str = "Cargo.toml";

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["hgtdist"], args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let result = validate_args(&parse(&["-i", EXISTING])).unwrap();
        assert_eq!(result.output, DEFAULT_OUTPUT);
        assert_eq!(result.output_format, OutputFormat::Nexus);
        assert_eq!(result.verbosity, Verbosity::Normal);
        assert_eq!(result.engine.percentage, 0.05);
        assert_eq!(result.engine.run_mode, RunMode::Both);
        assert!(result.engine.multithreading);
        assert_eq!(result.engine.progress_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_full_options() {
        let result = validate_args(&parse(&[
            "-i",
            EXISTING,
            "-o",
            "out.tsv",
            "-p",
            "0.25",
            "--run-mode",
            "higher",
            "--format",
            "tsv",
            "--disable-multithreading",
            "-s",
        ]))
        .unwrap();
        assert_eq!(result.output, "out.tsv");
        assert_eq!(result.output_format, OutputFormat::Tsv);
        assert_eq!(result.verbosity, Verbosity::Silent);
        assert_eq!(result.engine.run_mode, RunMode::HigherOnly);
        assert!(!result.engine.multithreading);
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(
            validate_args(&parse(&[])).err().as_deref(),
            Some("--input is required")
        );
        let err = validate_args(&parse(&["-i", "/definitely/not/here.nex"]))
            .err()
            .unwrap_or_default();
        assert!(err.starts_with("Couldn't find file"));
    }

    #[test]
    fn test_rejects_invalid_values() {
        for bad in [
            vec!["-i", EXISTING, "-p", "1.5"],
            vec!["-i", EXISTING, "-s", "-v"],
            vec!["-i", EXISTING, "--threads", "0"],
            vec!["-i", EXISTING, "--run-mode", "sideways"],
            vec!["-i", EXISTING, "--format", "phylip"],
            vec!["-i", EXISTING, "--progress-interval", "0"],
            vec!["-i", EXISTING, "-o", EXISTING],
        ] {
            assert!(validate_args(&parse(&bad)).is_err(), "{:?}", bad);
        }
    }
}
