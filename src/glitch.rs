//! Color-anomaly (glitch) detection.
//!
//! Every frame is decoded and reduced to its mean red, green and blue. A
//! frame is anomalous when the mean is green-dominant, has a pink cast, or
//! has any channel close to full scale. Sustained runs of anomalous frames
//! become [`DefectKind::Glitch`] events through the shared
//! [`SpanTracker`](crate::SpanTracker).

use std::path::Path;

use image::RgbImage;

use crate::config::{GlitchOptions, ScanOptions};
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind};
use crate::media::VideoSource;
use crate::progress::OperationType;
use crate::span::SpanTracker;

const DETAILS: &str = "green/pink/oversaturated anomaly";
const DETAILS_AT_END: &str = "green/pink/oversaturated anomaly (end)";

/// Mean channel values of a frame on the 0–255 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMeans {
    /// Mean red.
    pub red: f64,
    /// Mean green.
    pub green: f64,
    /// Mean blue.
    pub blue: f64,
}

impl ColorMeans {
    /// Average the pixels of `frame` below the top `crop_top_ratio` of its height.
    ///
    /// If the crop would remove every row the whole frame is used. Returns
    /// `None` for an empty frame.
    pub fn of_frame(frame: &RgbImage, crop_top_ratio: f64) -> Option<Self> {
        let (width, height) = frame.dimensions();
        let cut = (height as f64 * crop_top_ratio.clamp(0.0, 1.0)) as u32;
        let first_row = if cut < height { cut } else { 0 };
        let pixel_count = u64::from(width) * u64::from(height - first_row);
        if pixel_count == 0 {
            return None;
        }

        let row_bytes = width as usize * 3;
        let mut sums = [0u64; 3];
        for row in frame.as_raw().chunks_exact(row_bytes).skip(first_row as usize) {
            for pixel in row.chunks_exact(3) {
                sums[0] += u64::from(pixel[0]);
                sums[1] += u64::from(pixel[1]);
                sums[2] += u64::from(pixel[2]);
            }
        }

        let count = pixel_count as f64;
        Some(Self {
            red: sums[0] as f64 / count,
            green: sums[1] as f64 / count,
            blue: sums[2] as f64 / count,
        })
    }

    /// Classify the mean color against `options`.
    pub fn is_anomalous(&self, options: &GlitchOptions) -> bool {
        let Self { red, green, blue } = *self;
        let green_dominant = green > options.green_min && green > red && green > blue;
        let pink_cast = red > options.pink_min && blue > options.pink_min && green < options.pink_green_max;
        let oversaturated = red > options.saturated_min
            || green > options.saturated_min
            || blue > options.saturated_min;
        green_dominant || pink_cast || oversaturated
    }
}

/// Returns `true` if `frame` shows a color anomaly.
pub fn is_glitch_frame(frame: &RgbImage, options: &GlitchOptions) -> bool {
    ColorMeans::of_frame(frame, options.crop_top_ratio)
        .is_some_and(|means| means.is_anomalous(options))
}

/// Scan a sequence of frames at `frames_per_second` for sustained anomalies.
///
/// A decode error ends the scan as if the stream had ended there; spans
/// still open are flushed and the events found so far are returned. Frame
/// `i` sits at `i / frames_per_second` seconds, and the stream ends one
/// frame after the last frame scanned.
pub fn scan_glitches<I>(frames: I, frames_per_second: f64, options: &GlitchOptions) -> Vec<DefectEvent>
where
    I: IntoIterator<Item = Result<RgbImage, ScanError>>,
{
    if frames_per_second <= 0.0 {
        return Vec::new();
    }

    let mut tracker = SpanTracker::new(options.min_duration);
    let mut events = Vec::new();
    let mut scanned: u64 = 0;

    for frame in frames {
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!("Glitch scan stopped at frame {scanned}: {error}");
                break;
            }
        };
        let position = scanned as f64 / frames_per_second;
        if let Some(span) = tracker.observe(position, is_glitch_frame(&frame, options)) {
            events.extend(DefectEvent::new(DefectKind::Glitch, span.start, span.end, DETAILS));
        }
        scanned += 1;
    }

    if let Some(span) = tracker.finish(scanned as f64 / frames_per_second) {
        events.extend(DefectEvent::new(DefectKind::Glitch, span.start, span.end, DETAILS_AT_END));
    }
    events
}

/// Decode every frame of `path` and return its color-anomaly events.
///
/// # Errors
///
/// - [`ScanError::FileOpen`] / [`ScanError::NoVideoStream`] if the video
///   cannot be opened.
/// - [`ScanError::UnknownFrameRate`] if the stream has no frame rate.
pub fn detect_glitches(
    path: &Path,
    options: &GlitchOptions,
    scan_options: &ScanOptions,
) -> Result<Vec<DefectEvent>, ScanError> {
    let mut source = VideoSource::open(path)?;
    let frames_per_second = source.frames_per_second();
    if frames_per_second <= 0.0 {
        return Err(ScanError::UnknownFrameRate);
    }

    let total = Some(source.frame_count()).filter(|&count| count > 0);
    let mut tracker = scan_options.tracker(OperationType::GlitchScan, total);
    log::debug!("Glitch scan of {} ({total:?} frames)", path.display());

    let frames = source.frames()?.inspect(|_| tracker.advance());
    let events = scan_glitches(frames, frames_per_second, options);
    tracker.finish();

    log::info!("glitch: {} segment(s) in {}", events.len(), path.display());
    Ok(events)
}
