// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.input.is_none() {
            self.input = config.input;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.summary.is_none() {
            self.summary = config.summary;
        }

        // Core settings (only override defaults, not explicit CLI values)
        if self.format == "nexus" {
            if let Some(format) = config.format {
                self.format = format;
            }
        }
        if self.percentage == 0.05 {
            if let Some(percentage) = config.percentage {
                self.percentage = percentage;
            }
        }
        if self.run_mode == "both" {
            if let Some(run_mode) = config.run_mode {
                self.run_mode = run_mode;
            }
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }
        if self.progress_interval == 30 {
            if let Some(interval) = config.progress_interval {
                self.progress_interval = interval;
            }
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.disable_multithreading && config.disable_multithreading.unwrap_or(false) {
            self.disable_multithreading = true;
        }
        if !self.silent && !self.verbose {
            self.silent = config.silent.unwrap_or(false);
            self.verbose = config.verbose.unwrap_or(false);
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argh::FromArgs;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["hgtdist"], args).unwrap()
    }

    #[test]
    fn test_config_fills_unset_values() {
        let config = Config::from_toml(
            "input = \"in.nex\"\npercentage = 0.2\nrun_mode = \"lesser\"\nverbose = true\n",
        )
        .unwrap();
        let args = parse(&[]).merge_with_config(config);
        assert_eq!(args.input.as_deref(), Some("in.nex"));
        assert_eq!(args.percentage, 0.2);
        assert_eq!(args.run_mode, "lesser");
        assert!(args.verbose);
    }

    #[test]
    fn test_cli_values_win() {
        let config = Config::from_toml(
            "input = \"config.nex\"\npercentage = 0.2\nformat = \"json\"\nsilent = true\n",
        )
        .unwrap();
        let args = parse(&["-i", "cli.nex", "-p", "0.1", "--format", "tsv", "-v"])
            .merge_with_config(config);
        assert_eq!(args.input.as_deref(), Some("cli.nex"));
        assert_eq!(args.percentage, 0.1);
        assert_eq!(args.format, "tsv");
        assert!(args.verbose);
        assert!(!args.silent);
    }

    #[test]
    fn test_flags_from_config() {
        let config =
            Config::from_toml("disable_multithreading = true\ndry_run = true\nthreads = 3\n")
                .unwrap();
        let args = parse(&[]).merge_with_config(config);
        assert!(args.disable_multithreading);
        assert!(args.dry_run);
        assert_eq!(args.threads, Some(3));
    }
}
