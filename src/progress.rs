//! Progress reporting for long-running scans.
//!
//! Frame scans and audio window searches can take minutes on archive
//! material. [`ProgressCallback`] receives periodic [`ProgressInfo`]
//! snapshots so a front end can draw a progress bar.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use vidscan::{Analyzer, FfmpegCli, ProgressCallback, ProgressInfo, ScanOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}%", info.operation);
//!         }
//!     }
//! }
//!
//! let options = ScanOptions::new()
//!     .with_progress(Arc::new(PrintProgress))
//!     .with_batch_size(250);
//! let analyzer = Analyzer::new(FfmpegCli::new()).with_options(options);
//! let result = analyzer.analyze("tape_07.mkv");
//! println!("{}", result.summary_line());
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of scan currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Decoding every frame for color anomalies.
    GlitchScan,
    /// Sampling frames for gray noise and stripes.
    StripeScan,
    /// Searching audio windows for the calibration tone.
    ToneScan,
    /// Analysing a list of videos.
    BatchAnalysis,
}

/// A snapshot of scan progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// Items (frames, samples, windows, videos) processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because batches may be
/// analysed on worker threads when the `rayon` feature is enabled.
pub trait ProgressCallback: Send + Sync {
    /// Called at regular intervals during a scan.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks progress timing and emits callbacks every `batch_size` items.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed item.
    pub(crate) fn advance(&mut self) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report();
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final report.
    pub(crate) fn finish(&mut self) {
        self.report();
    }

    fn report(&self) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current.min(t) as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
        });
    }
}
