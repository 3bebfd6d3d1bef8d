//! Detector thresholds and scan settings.
//!
//! [`DetectorConfig`] bundles the immutable thresholds of every detector.
//! It is passed explicitly into each detector call, so two analyses with
//! different thresholds can run side by side without sharing state.
//!
//! [`ScanOptions`] carries operational settings (progress callback and
//! reporting cadence) that do not change what is detected.
//!
//! # Example
//!
//! ```
//! use vidscan::{DetectorConfig, GlitchOptions};
//!
//! let config = DetectorConfig::new()
//!     .with_glitch(GlitchOptions::new().crop_top_ratio(0.1).min_duration(8.0));
//! assert_eq!(config.glitch.min_duration, 8.0);
//! assert_eq!(config.black.min_duration, 10.0);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker};

/// Settings for the `blackdetect` scene filter.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackDetectOptions {
    /// Minimum black run length in seconds. Default: 10.0.
    pub min_duration: f64,
    /// Luma ratio below which a pixel counts as black (0.0–1.0). Default: 0.10.
    pub pixel_threshold: f64,
    /// Fraction of black pixels for a picture to count as black. Default: 0.98.
    pub picture_threshold: f64,
}

impl Default for BlackDetectOptions {
    fn default() -> Self {
        Self {
            min_duration: 10.0,
            pixel_threshold: 0.10,
            picture_threshold: 0.98,
        }
    }
}

impl BlackDetectOptions {
    /// Create black-detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum black run length in seconds.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        self.min_duration = seconds;
        self
    }

    /// Set the per-pixel luma threshold.
    pub fn pixel_threshold(mut self, threshold: f64) -> Self {
        self.pixel_threshold = threshold;
        self
    }

    /// Set the black-pixel ratio required per picture.
    pub fn picture_threshold(mut self, threshold: f64) -> Self {
        self.picture_threshold = threshold;
        self
    }
}

/// Settings for the `freezedetect` scene filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FreezeDetectOptions {
    /// Noise tolerance between consecutive frames. Default: 0.003.
    pub noise: f64,
    /// Minimum freeze length in seconds. Default: 5.0.
    pub min_duration: f64,
}

impl Default for FreezeDetectOptions {
    fn default() -> Self {
        Self {
            noise: 0.003,
            min_duration: 5.0,
        }
    }
}

impl FreezeDetectOptions {
    /// Create freeze-detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the noise tolerance.
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Set the minimum freeze length in seconds.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        self.min_duration = seconds;
        self
    }
}

/// Settings for the color-anomaly detector.
///
/// Channel thresholds are on the 0–255 scale and apply to the mean color of
/// the whole (optionally cropped) frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GlitchOptions {
    /// Fraction of the frame height cut from the top before averaging,
    /// used to ignore burnt-in overlays. Default: 0.0.
    pub crop_top_ratio: f64,
    /// Minimum sustained anomaly in seconds. Default: 10.0.
    pub min_duration: f64,
    /// Green mean above which a green-dominant frame is anomalous. Default: 180.
    pub green_min: f64,
    /// Red and blue means above which a pink cast is considered. Default: 180.
    pub pink_min: f64,
    /// Green mean below which a pink cast is anomalous. Default: 130.
    pub pink_green_max: f64,
    /// Any channel mean above this is treated as oversaturated. Default: 230.
    pub saturated_min: f64,
}

impl Default for GlitchOptions {
    fn default() -> Self {
        Self {
            crop_top_ratio: 0.0,
            min_duration: 10.0,
            green_min: 180.0,
            pink_min: 180.0,
            pink_green_max: 130.0,
            saturated_min: 230.0,
        }
    }
}

impl GlitchOptions {
    /// Create glitch-detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fraction of the frame cut from the top. Clamped to 0.0–1.0.
    pub fn crop_top_ratio(mut self, ratio: f64) -> Self {
        self.crop_top_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Set the minimum sustained anomaly in seconds.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        self.min_duration = seconds;
        self
    }

    /// Set the oversaturation threshold.
    pub fn saturated_min(mut self, value: f64) -> Self {
        self.saturated_min = value;
        self
    }
}

/// Settings for the calibration-tone detector.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneOptions {
    /// Tone frequency in hertz. Default: 1000.
    pub frequency: f64,
    /// Accepted deviation of the spectral peak in hertz. Default: 50.
    pub tolerance: f64,
    /// Analysis window length in seconds (windows overlap by half). Default: 5.0.
    pub window_duration: f64,
    /// Sample rate the audio track is resampled to. Default: 44100.
    pub sample_rate: u32,
}

impl Default for ToneOptions {
    fn default() -> Self {
        Self {
            frequency: 1000.0,
            tolerance: 50.0,
            window_duration: 5.0,
            sample_rate: 44_100,
        }
    }
}

impl ToneOptions {
    /// Create tone-detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tone frequency in hertz.
    pub fn frequency(mut self, hertz: f64) -> Self {
        self.frequency = hertz;
        self
    }

    /// Set the accepted peak deviation in hertz.
    pub fn tolerance(mut self, hertz: f64) -> Self {
        self.tolerance = hertz;
        self
    }

    /// Set the analysis window length in seconds.
    pub fn window_duration(mut self, seconds: f64) -> Self {
        self.window_duration = seconds;
        self
    }

    /// Returns `true` if `hertz` falls inside the accepted band.
    pub fn matches(&self, hertz: f64) -> bool {
        (hertz - self.frequency).abs() <= self.tolerance
    }
}

/// Settings for the gray-noise / stripe detector.
#[derive(Debug, Clone, PartialEq)]
pub struct StripeOptions {
    /// Frames inspected per second of video. Default: 1.0.
    pub samples_per_second: f64,
    /// Frames taller than this are downscaled before scoring. Default: 480.
    pub analysis_height: u32,
    /// Mean HSV saturation (0–255) at or below which a frame is gray. Default: 40.
    pub saturation_max: f64,
    /// Laplacian variance at or above which a frame is noisy. Default: 120.
    pub noise_min: f64,
    /// Column-mean standard deviation at or above which a frame is striped. Default: 10.
    pub stripe_min: f64,
    /// Minimum sustained defect in seconds. Default: 10.0.
    pub min_duration: f64,
}

impl Default for StripeOptions {
    fn default() -> Self {
        Self {
            samples_per_second: 1.0,
            analysis_height: 480,
            saturation_max: 40.0,
            noise_min: 120.0,
            stripe_min: 10.0,
            min_duration: 10.0,
        }
    }
}

impl StripeOptions {
    /// Create stripe-detection settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many frames per second of video are inspected.
    pub fn samples_per_second(mut self, rate: f64) -> Self {
        self.samples_per_second = rate;
        self
    }

    /// Set the minimum sustained defect in seconds.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        self.min_duration = seconds;
        self
    }

    /// Frame stride for a stream at `frames_per_second`, never below 1.
    pub fn stride(&self, frames_per_second: f64) -> u64 {
        let rate = self.samples_per_second.max(0.1);
        ((frames_per_second / rate).round() as u64).max(1)
    }
}

/// Thresholds for all five detectors.
///
/// The value is immutable once built; clone it to derive a variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorConfig {
    /// Black-segment detection.
    pub black: BlackDetectOptions,
    /// Freeze-segment detection.
    pub freeze: FreezeDetectOptions,
    /// Color-anomaly detection.
    pub glitch: GlitchOptions,
    /// Calibration-tone detection.
    pub tone: ToneOptions,
    /// Gray-noise / stripe detection.
    pub stripe: StripeOptions,
}

impl DetectorConfig {
    /// Create a configuration with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the black-detection settings.
    #[must_use]
    pub fn with_black(mut self, options: BlackDetectOptions) -> Self {
        self.black = options;
        self
    }

    /// Replace the freeze-detection settings.
    #[must_use]
    pub fn with_freeze(mut self, options: FreezeDetectOptions) -> Self {
        self.freeze = options;
        self
    }

    /// Replace the glitch-detection settings.
    #[must_use]
    pub fn with_glitch(mut self, options: GlitchOptions) -> Self {
        self.glitch = options;
        self
    }

    /// Replace the tone-detection settings.
    #[must_use]
    pub fn with_tone(mut self, options: ToneOptions) -> Self {
        self.tone = options;
        self
    }

    /// Replace the stripe-detection settings.
    #[must_use]
    pub fn with_stripe(mut self, options: StripeOptions) -> Self {
        self.stripe = options;
        self
    }
}

/// Operational settings for a scan.
///
/// Carries the progress callback and how often it fires. A default
/// `ScanOptions` reports nothing.
#[derive(Clone)]
pub struct ScanOptions {
    pub(crate) progress: Option<Arc<dyn ProgressCallback>>,
    pub(crate) batch_size: u64,
}

impl Debug for ScanOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScanOptions")
            .field("has_progress", &self.progress.is_some())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOptions {
    /// Create options with no progress callback and batch size 1.
    pub fn new() -> Self {
        Self {
            progress: None,
            batch_size: 1,
        }
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Fire the progress callback every `size` items. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub(crate) fn tracker(&self, operation: OperationType, total: Option<u64>) -> ProgressTracker {
        let callback = self
            .progress
            .clone()
            .unwrap_or_else(|| Arc::new(NoOpProgress));
        ProgressTracker::new(callback, operation, total, self.batch_size)
    }
}
