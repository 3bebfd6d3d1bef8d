//! Gray-noise and stripe detection.
//!
//! Tape dropouts often show up as a colorless picture full of snow or
//! vertical banding. Frames are sampled at a fixed rate (one per second by
//! default) and scored on three measures:
//!
//! - mean HSV saturation, 0–255 scale (low means gray),
//! - variance of a 3×3 Laplacian over luma (high means noisy),
//! - standard deviation of the per-column mean luma (high means striped).
//!
//! A frame is defective when it is gray and either noisy or striped.
//! Sustained defective runs become [`DefectKind::Stripe`] events through
//! the shared [`SpanTracker`](crate::SpanTracker).

use std::path::Path;

use image::{RgbImage, imageops::FilterType};

use crate::config::{ScanOptions, StripeOptions};
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind};
use crate::media::VideoSource;
use crate::progress::OperationType;
use crate::span::SpanTracker;

/// Scores of one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripeScore {
    /// Mean HSV saturation on the 0–255 scale.
    pub saturation: f64,
    /// Variance of the Laplacian of luma.
    pub noise: f64,
    /// Standard deviation of the column means of luma.
    pub stripe: f64,
}

impl StripeScore {
    /// Score `frame`, downscaling it first if it is taller than
    /// `analysis_height` (aspect ratio preserved).
    pub fn of_frame(frame: &RgbImage, analysis_height: u32) -> Self {
        let (width, height) = frame.dimensions();
        if analysis_height > 0 && height > analysis_height {
            let scale = analysis_height as f64 / height as f64;
            let scaled_width = ((width as f64 * scale) as u32).max(1);
            let scaled =
                image::imageops::resize(frame, scaled_width, analysis_height, FilterType::Triangle);
            return Self::of_unscaled(&scaled);
        }
        Self::of_unscaled(frame)
    }

    fn of_unscaled(frame: &RgbImage) -> Self {
        let (width, height) = (frame.width() as usize, frame.height() as usize);
        if width == 0 || height == 0 {
            return Self {
                saturation: 0.0,
                noise: 0.0,
                stripe: 0.0,
            };
        }

        let mut saturation_sum = 0.0;
        let mut luma = Vec::with_capacity(width * height);
        for pixel in frame.pixels() {
            let [r, g, b] = pixel.0;
            let max = r.max(g).max(b);
            let min = r.min(g).min(b);
            if max > 0 {
                saturation_sum += (255.0 * f64::from(max - min) / f64::from(max)).round();
            }
            luma.push(
                (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)).round(),
            );
        }

        Self {
            saturation: saturation_sum / (width * height) as f64,
            noise: laplacian_variance(&luma, width, height),
            stripe: column_mean_deviation(&luma, width, height),
        }
    }

    /// Gray and (noisy or striped) according to `options`.
    pub fn is_defective(&self, options: &StripeOptions) -> bool {
        self.saturation <= options.saturation_max
            && (self.noise >= options.noise_min || self.stripe >= options.stripe_min)
    }
}

/// Reflect an out-of-range index back into `0..len`, mirroring around the
/// edge pixel without repeating it.
fn reflect(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let mut index = index.abs();
    if index > last {
        index = 2 * last - index;
    }
    index as usize
}

/// Variance of the 3×3 aperture Laplacian `[2 0 2; 0 -8 0; 2 0 2]`.
fn laplacian_variance(luma: &[f64], width: usize, height: usize) -> f64 {
    let at = |x: isize, y: isize| luma[reflect(y, height) * width + reflect(x, width)];

    let mut sum = 0.0;
    let mut sum_squares = 0.0;
    for y in 0..height as isize {
        for x in 0..width as isize {
            let corners = at(x - 1, y - 1) + at(x + 1, y - 1) + at(x - 1, y + 1) + at(x + 1, y + 1);
            let response = 2.0 * corners - 8.0 * at(x, y);
            sum += response;
            sum_squares += response * response;
        }
    }

    let count = (width * height) as f64;
    let mean = sum / count;
    (sum_squares / count - mean * mean).max(0.0)
}

/// Population standard deviation of the column means.
fn column_mean_deviation(luma: &[f64], width: usize, height: usize) -> f64 {
    let mut columns = vec![0.0; width];
    for row in luma.chunks_exact(width) {
        for (total, value) in columns.iter_mut().zip(row) {
            *total += value;
        }
    }
    columns.iter_mut().for_each(|total| *total /= height as f64);

    let mean = columns.iter().sum::<f64>() / width as f64;
    let variance = columns.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / width as f64;
    variance.sqrt()
}

/// Scan `(position, frame)` samples for sustained gray noise or stripes.
///
/// A failed sample ends the scan at its position; otherwise an open span is
/// flushed at `stream_end`.
pub fn scan_stripes<I>(samples: I, stream_end: f64, options: &StripeOptions) -> Vec<DefectEvent>
where
    I: IntoIterator<Item = (f64, Result<RgbImage, ScanError>)>,
{
    let mut tracker = SpanTracker::new(options.min_duration);
    let mut events = Vec::new();
    let mut end = stream_end;

    for (position, frame) in samples {
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("Stripe scan stopped at {position:.2}s: {error}");
                end = position;
                break;
            }
        };
        let score = StripeScore::of_frame(&frame, options.analysis_height);
        if let Some(span) = tracker.observe(position, score.is_defective(options)) {
            events.extend(DefectEvent::new(
                DefectKind::Stripe,
                span.start,
                span.end,
                describe(options),
            ));
        }
    }

    if let Some(span) = tracker.finish(end) {
        events.extend(DefectEvent::new(
            DefectKind::Stripe,
            span.start,
            span.end,
            "gray+noisy/striped (end)",
        ));
    }
    events
}

fn describe(options: &StripeOptions) -> String {
    format!(
        "gray+noisy/striped (S≤{}, lapVar≥{} or stripeSTD≥{})",
        options.saturation_max, options.noise_min, options.stripe_min
    )
}

/// Sample frames of `path` and return its gray-noise / stripe events.
///
/// # Errors
///
/// - [`ScanError::FileOpen`] / [`ScanError::NoVideoStream`] if the video
///   cannot be opened.
/// - [`ScanError::UnknownFrameRate`] if the stream has no frame rate.
pub fn detect_stripes(
    path: &Path,
    options: &StripeOptions,
    scan_options: &ScanOptions,
) -> Result<Vec<DefectEvent>, ScanError> {
    let mut source = VideoSource::open(path)?;
    let frames_per_second = source.frames_per_second();
    if frames_per_second <= 0.0 {
        return Err(ScanError::UnknownFrameRate);
    }
    let frame_count = source.frame_count();
    if frame_count == 0 {
        log::warn!("Stripe scan skipped for {}: frame count unknown", path.display());
        return Ok(Vec::new());
    }

    let stride = options.stride(frames_per_second);
    let mut tracker =
        scan_options.tracker(OperationType::StripeScan, Some(frame_count.div_ceil(stride)));
    log::debug!(
        "Stripe scan of {} (every {stride} of {frame_count} frames)",
        path.display()
    );

    let samples = (0..frame_count).step_by(stride as usize).map(|index| {
        tracker.advance();
        (index as f64 / frames_per_second, source.sample_frame(index))
    });
    let events = scan_stripes(samples, frame_count as f64 / frames_per_second, options);
    tracker.finish();

    log::info!("stripe: {} segment(s) in {}", events.len(), path.display());
    Ok(events)
}
