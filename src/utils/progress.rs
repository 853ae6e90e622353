//! Progress tracking for long-running operations.
//!
//! The document renderer walks through millions of blocks on a default
//! run, so the reporter prints on a derived step rather than every
//! increment.
//!
//! # Usage
//!
//! ```ignore
//! use ctxkit::utils::ProgressReporter;
//!
//! let reporter = ProgressReporter::new("Rendering", 1000);
//! for _ in 0..1000 {
//!     // Do some work...
//!     reporter.inc();
//! }
//! reporter.finish();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Progress reporter with optional terminal output
///
/// Uses an atomic counter so a reporter clone can be handed to another
/// task if needed.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    /// Name of the operation being tracked
    name: String,

    /// Total units of work (0 if unknown)
    total: usize,

    /// Print every `step` units; keeps output bounded for large totals
    step: usize,

    /// Current progress
    current: Arc<AtomicUsize>,

    /// Start time for calculating ETA
    start_time: Instant,

    /// Whether to show progress output
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    ///
    /// - `name`: Description of the operation
    /// - `total`: Total number of units of work (0 for indeterminate)
    pub fn new(name: &str, total: usize) -> Self {
        Self {
            name: name.to_string(),
            total,
            step: print_step(total),
            current: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            quiet: std::env::var("CTXKIT_QUIET").is_ok(),
        }
    }

    /// Create a quiet reporter that doesn't output anything
    pub fn quiet(name: &str, total: usize) -> Self {
        Self {
            name: name.to_string(),
            total,
            step: print_step(total),
            current: Arc::new(AtomicUsize::new(0)),
            start_time: Instant::now(),
            quiet: true,
        }
    }

    /// Increment progress by one unit
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment progress by multiple units
    pub fn inc_by(&self, delta: usize) {
        let new_value = self.current.fetch_add(delta, Ordering::SeqCst) + delta;

        if !self.quiet && (new_value % self.step == 0 || new_value >= self.total) {
            self.print_progress(new_value);
        }
    }

    /// Set the current progress to a specific value
    pub fn set(&self, value: usize) {
        self.current.store(value, Ordering::SeqCst);

        if !self.quiet {
            self.print_progress(value);
        }
    }

    /// Print current progress
    fn print_progress(&self, current: usize) {
        let elapsed = self.start_time.elapsed();

        if self.total > 0 {
            let percent = (current as f64 / self.total as f64 * 100.0).min(100.0);
            let eta = self.estimate_eta(current);

            print!(
                "\r{}: [{:>3.0}%] {}/{} ({} elapsed, ETA: {})",
                self.name,
                percent,
                current,
                self.total,
                Self::format_duration(elapsed),
                Self::format_duration(eta)
            );
        } else {
            let dots = Self::loading_dots(current);
            print!(
                "\r{}: {} ({} elapsed)",
                self.name,
                dots,
                Self::format_duration(elapsed)
            );
        }

        if current >= self.total && self.total > 0 {
            println!();
        } else {
            use std::io::Write;
            let _ = std::io::stdout().flush();
        }
    }

    /// Estimate time remaining
    fn estimate_eta(&self, current: usize) -> Duration {
        if current == 0 {
            return Duration::ZERO;
        }

        let elapsed = self.start_time.elapsed();
        let per_unit_secs = elapsed.as_secs_f64() / current as f64;
        let remaining = self.total.saturating_sub(current);

        Duration::from_secs((per_unit_secs * remaining as f64) as u64)
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();

        if secs >= 60 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}s", secs)
        }
    }

    /// Generate loading dots for indeterminate progress
    fn loading_dots(count: usize) -> String {
        let dots = count % 5;
        format!("{}{}", ".".repeat(dots), " ".repeat(4 - dots))
    }

    /// Finish the progress and print final stats
    pub fn finish(&self) {
        let current = self.current.load(Ordering::SeqCst);
        let elapsed = self.start_time.elapsed();

        if !self.quiet {
            if self.total > 0 {
                println!(
                    "{}: completed {}/{} in {} ({:.1} items/sec)",
                    self.name,
                    current,
                    self.total,
                    Self::format_duration(elapsed),
                    current as f64 / elapsed.as_secs_f64().max(0.001)
                );
            } else {
                println!(
                    "{}: completed {} items in {}",
                    self.name,
                    current,
                    Self::format_duration(elapsed)
                );
            }
        }
    }

    /// Get the current progress count
    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    /// Check if the operation is complete
    pub fn is_done(&self) -> bool {
        let current = self.current.load(Ordering::SeqCst);
        self.total > 0 && current >= self.total
    }
}

/// Roughly a thousand prints per run, whatever the total
fn print_step(total: usize) -> usize {
    (total / 1000).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = ProgressReporter::quiet("test", 100);
        assert_eq!(reporter.total, 100);
        assert!(reporter.quiet);
    }

    #[test]
    fn test_progress_reporter_increment() {
        let reporter = ProgressReporter::quiet("test", 100);
        reporter.inc();
        assert_eq!(reporter.current(), 1);

        reporter.inc_by(5);
        assert_eq!(reporter.current(), 6);
    }

    #[test]
    fn test_progress_reporter_set() {
        let reporter = ProgressReporter::quiet("test", 100);
        reporter.set(50);
        assert_eq!(reporter.current(), 50);
    }

    #[test]
    fn test_progress_reporter_is_done() {
        let reporter = ProgressReporter::quiet("test", 10);
        assert!(!reporter.is_done());

        reporter.set(5);
        assert!(!reporter.is_done());

        reporter.set(10);
        assert!(reporter.is_done());
    }

    #[test]
    fn test_progress_reporter_zero_total() {
        let reporter = ProgressReporter::quiet("test", 0);
        assert!(!reporter.is_done());

        reporter.inc();
        assert!(!reporter.is_done()); // Never done when total is 0
    }

    #[test]
    fn test_print_step_scales_with_total() {
        assert_eq!(print_step(0), 1);
        assert_eq!(print_step(500), 1);
        assert_eq!(print_step(100_000), 100);
        assert_eq!(ProgressReporter::quiet("test", 2_000_000).step, 2000);
    }
}
