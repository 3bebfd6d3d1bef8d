//! Per-video analysis pipeline.
//!
//! [`Analyzer`] runs the five detectors over one video in a fixed order
//! (black, glitch, freeze, tone, stripe), then merges their events into a
//! [`VideoAnalysisResult`]. Detectors are independent: one that fails is
//! recorded as a [`DetectorIssue`] and the rest still run.

use std::path::{Path, PathBuf};

use crate::batch::sort_naturally;
use crate::black::detect_black;
use crate::config::{DetectorConfig, ScanOptions};
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind};
use crate::freeze::detect_freezes;
use crate::glitch::detect_glitches;
use crate::media::probe_duration;
use crate::progress::OperationType;
use crate::report::{DetectorIssue, VideoAnalysisResult};
use crate::stripe::detect_stripes;
use crate::tone::detect_tone;
use crate::toolchain::MediaToolchain;

/// Runs every detector over a video and assembles the result.
///
/// The analyzer holds no per-video state; one instance can analyse any
/// number of files, from several threads at once.
///
/// # Example
///
/// ```no_run
/// use vidscan::{Analyzer, DetectorConfig, FfmpegCli, GlitchOptions};
///
/// let config = DetectorConfig::new().with_glitch(GlitchOptions::new().crop_top_ratio(0.08));
/// let analyzer = Analyzer::new(FfmpegCli::new()).with_config(config);
///
/// let result = analyzer.analyze("tape_12.mov");
/// for event in result.events() {
///     println!("{} {:.1}s..{:.1}s {}", event.kind(), event.start_sec(), event.end_sec(), event.details());
/// }
/// println!("{}", result.summary_line());
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer<T: MediaToolchain> {
    toolchain: T,
    config: DetectorConfig,
    options: ScanOptions,
}

impl<T: MediaToolchain> Analyzer<T> {
    /// Create an analyzer with default thresholds and no progress reporting.
    pub fn new(toolchain: T) -> Self {
        Self {
            toolchain,
            config: DetectorConfig::default(),
            options: ScanOptions::default(),
        }
    }

    /// Use `config` for all detectors.
    #[must_use]
    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Use `options` for progress reporting.
    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// The thresholds in use.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// The external toolchain in use.
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    /// Analyse one video.
    ///
    /// Never fails as a whole: a detector that cannot run contributes no
    /// events and is listed in [`VideoAnalysisResult::issues`].
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> VideoAnalysisResult {
        let path = path.as_ref();
        let video_id = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("Analysing {video_id}");

        let duration_sec = probe_duration(&self.toolchain, path);
        let config = &self.config;
        let mut collector = Collector::default();

        collector.take(
            DefectKind::Black,
            detect_black(&self.toolchain, path, &config.black),
        );
        collector.take(
            DefectKind::Glitch,
            detect_glitches(path, &config.glitch, &self.options),
        );
        collector.take(
            DefectKind::Freeze,
            detect_freezes(&self.toolchain, path, &config.freeze, duration_sec),
        );
        collector.take(
            DefectKind::Tone,
            detect_tone(&self.toolchain, path, &config.tone, &self.options),
        );
        collector.take(
            DefectKind::Stripe,
            detect_stripes(path, &config.stripe, &self.options),
        );

        let result = VideoAnalysisResult::from_events(video_id, duration_sec, collector.events)
            .with_issues(collector.issues);
        log::info!("{}: {}", result.video_id(), result.summary_line());
        result
    }

    /// Analyse `paths` one after another, in natural file-name order.
    pub fn analyze_batch(&self, paths: &[PathBuf]) -> Vec<VideoAnalysisResult> {
        let mut ordered = paths.to_vec();
        sort_naturally(&mut ordered);

        let mut tracker = self
            .options
            .tracker(OperationType::BatchAnalysis, Some(ordered.len() as u64));
        let results = ordered
            .iter()
            .map(|path| {
                let result = self.analyze(path);
                tracker.advance();
                result
            })
            .collect();
        tracker.finish();
        results
    }

    /// Analyse `paths` on the rayon thread pool.
    ///
    /// Results are returned in natural file-name order regardless of which
    /// video finishes first.
    #[cfg(feature = "rayon")]
    pub fn analyze_batch_parallel(&self, paths: &[PathBuf]) -> Vec<VideoAnalysisResult> {
        let mut ordered = paths.to_vec();
        sort_naturally(&mut ordered);
        crate::rayon::analyze_parallel(self, &ordered, &self.options)
    }
}

#[derive(Default)]
struct Collector {
    events: Vec<DefectEvent>,
    issues: Vec<DetectorIssue>,
}

impl Collector {
    fn take(&mut self, detector: DefectKind, outcome: Result<Vec<DefectEvent>, ScanError>) {
        match outcome {
            Ok(events) => self.events.extend(events),
            Err(error) => {
                log::warn!("{detector} detector failed: {error}");
                self.issues.push(DetectorIssue::new(detector, error.to_string()));
            }
        }
    }
}
