// mod.rs - Reporting interface shared by the loader, engine and writers

use indicatif::{ProgressBar, ProgressStyle};
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

/// How much the console reporter prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only severe messages
    Silent,
    Normal,
    /// Also every potential candidate
    Verbose,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(Verbosity::Silent),
            "normal" => Ok(Verbosity::Normal),
            "verbose" => Ok(Verbosity::Verbose),
            _ => Err(format!(
                "Invalid verbosity: {}. Use: silent, normal, verbose",
                s
            )),
        }
    }
}

/// Sink for messages and progress. Passed explicitly to every component
/// that reports; implementations must tolerate calls from worker threads.
pub trait Reporter: Send + Sync {
    /// Fine-grained output, e.g. every potential candidate
    fn detail(&self, message: &str);

    /// Phase messages, skipped species, totals
    fn notice(&self, message: &str);

    /// Internal defects and fatal conditions; never suppressed
    fn severe(&self, message: &str);

    /// Processed genes out of the total
    fn progress(&self, processed: usize, total: usize);

    fn progress_finished(&self, processed: usize, total: usize);
}

/// Prints to the terminal with an indicatif progress bar
pub struct ConsoleReporter {
    verbosity: Verbosity,
    bar: OnceLock<ProgressBar>,
}

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta} {msg}";

const FINISHED_MESSAGE: &str = "✅ Distributions evaluated!";

impl ConsoleReporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            bar: OnceLock::new(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    fn progress_bar(&self, total: usize) -> &ProgressBar {
        self.bar.get_or_init(|| {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        })
    }

    fn print(&self, message: &str) {
        match self.bar.get() {
            Some(pb) if !pb.is_finished() => pb.println(message),
            _ => println!("{}", message),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn detail(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            self.print(message);
        }
    }

    fn notice(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            self.print(message);
        }
    }

    fn severe(&self, message: &str) {
        match self.bar.get() {
            Some(pb) if !pb.is_finished() => pb.suspend(|| eprintln!("⚠️  {}", message)),
            _ => eprintln!("⚠️  {}", message),
        }
    }

    fn progress(&self, processed: usize, total: usize) {
        if self.verbosity == Verbosity::Silent {
            return;
        }
        self.progress_bar(total).set_position(processed as u64);
    }

    fn progress_finished(&self, processed: usize, total: usize) {
        if self.verbosity == Verbosity::Silent {
            return;
        }
        let pb = self.progress_bar(total);
        pb.set_position(processed as u64);
        pb.finish_with_message(FINISHED_MESSAGE);
    }
}

/// Message level recorded by [`CollectingReporter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Detail,
    Notice,
    Severe,
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    messages: Mutex<Vec<(Level, String)>>,
    progress: Mutex<Vec<(usize, usize)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Every (processed, total) pair reported, finished included
    pub fn progress_updates(&self) -> Vec<(usize, usize)> {
        self.progress
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn record(&self, level: Level, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((level, message.to_string()));
        }
    }
}

impl Reporter for CollectingReporter {
    fn detail(&self, message: &str) {
        self.record(Level::Detail, message);
    }

    fn notice(&self, message: &str) {
        self.record(Level::Notice, message);
    }

    fn severe(&self, message: &str) {
        self.record(Level::Severe, message);
    }

    fn progress(&self, processed: usize, total: usize) {
        if let Ok(mut progress) = self.progress.lock() {
            progress.push((processed, total));
        }
    }

    fn progress_finished(&self, processed: usize, total: usize) {
        self.progress(processed, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_order_and_parse() {
        assert!(Verbosity::Silent < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
        assert_eq!("VERBOSE".parse::<Verbosity>().unwrap(), Verbosity::Verbose);
        assert!("loud".parse::<Verbosity>().is_err());
    }

    #[test]
    fn test_collecting_reporter_levels() {
        let reporter = CollectingReporter::new();
        reporter.detail("d");
        reporter.notice("n");
        reporter.severe("s");
        reporter.progress(1, 4);

        assert_eq!(reporter.messages().len(), 3);
        assert_eq!(reporter.messages_at(Level::Severe), vec!["s".to_string()]);
        assert_eq!(reporter.progress_updates(), vec![(1, 4)]);
    }

    #[test]
    fn test_silent_console_reporter_skips_progress_bar() {
        let reporter = ConsoleReporter::new(Verbosity::Silent);
        reporter.progress(1, 2);
        reporter.progress_finished(2, 2);
        assert!(reporter.bar.get().is_none());
        assert_eq!(reporter.verbosity(), Verbosity::Silent);
    }

    #[test]
    fn test_progress_template_shows_message() {
        assert!(PROGRESS_TEMPLATE.contains("{msg}"));
        assert!(ProgressStyle::default_bar().template(PROGRESS_TEMPLATE).is_ok());
    }

    #[test]
    fn test_finished_bar_carries_message() {
        let reporter = ConsoleReporter::new(Verbosity::Normal);
        reporter.progress(1, 3);
        reporter.progress_finished(3, 3);
        let pb = reporter.bar.get().unwrap();
        assert!(pb.is_finished());
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.message(), FINISHED_MESSAGE);
    }
}
