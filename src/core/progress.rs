// progress.rs - Background progress monitor for the detection run

use crate::reporting::Reporter;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{Scope, ScopedJoinHandle};
use std::time::Duration;

/// Percentage of processed genes; an empty run counts as complete
pub fn percent_complete(processed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        processed as f64 / total as f64 * 100.0
    }
}

/// Wakes every `interval`, reads the shared gene counter and reports it.
///
/// Exits once the counter reaches the total, when [`stop`](Self::stop) is
/// called, or when the monitor is dropped.
pub struct ProgressMonitor<'scope> {
    stop: Sender<()>,
    handle: ScopedJoinHandle<'scope, ()>,
}

impl<'scope> ProgressMonitor<'scope> {
    pub fn spawn<'env>(
        scope: &'scope Scope<'scope, 'env>,
        counter: &'env AtomicUsize,
        total: usize,
        interval: Duration,
        reporter: &'env dyn Reporter,
    ) -> Self {
        let (stop, stop_signal) = mpsc::channel::<()>();

        let handle = scope.spawn(move || loop {
            match stop_signal.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let processed = counter.load(Ordering::Relaxed);
                    if processed >= total {
                        return;
                    }
                    reporter.progress(processed, total);
                    reporter.detail(&format!(
                        "⏳ {:.1}% of genes evaluated ({}/{})",
                        percent_complete(processed, total),
                        processed,
                        total
                    ));
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        });

        Self { stop, handle }
    }

    /// Cancel the monitor and wait for it to exit
    pub fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.handle.join();
    }
}
