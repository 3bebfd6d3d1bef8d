//! Freeze-segment detection.
//!
//! Runs FFmpeg's `freezedetect` filter. The filter reports start and end on
//! separate lines:
//!
//! ```text
//! [freezedetect @ 0x55d] lavfi.freezedetect.freeze_start: 20.02
//! [freezedetect @ 0x55d] lavfi.freezedetect.freeze_duration: 6.04
//! [freezedetect @ 0x55d] lavfi.freezedetect.freeze_end: 26.06
//! ```
//!
//! Each start is paired with the next end. The filter does not print an end
//! for a freeze that lasts until the last frame; such a freeze is closed at
//! the video duration, the same way the frame-based detectors flush a span
//! that is still open at the end of the stream.

use std::path::Path;

use crate::config::FreezeDetectOptions;
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind};
use crate::toolchain::{MediaToolchain, SceneFilter};

const START_MARKER: &str = "freeze_start:";
const END_MARKER: &str = "freeze_end:";

/// Run `freezedetect` on `path` and return the frozen segments found.
///
/// `duration_sec` closes a freeze still open at the end of the stream;
/// pass 0.0 when the duration is unknown to drop such a freeze instead.
///
/// # Errors
///
/// Returns the toolchain's error if the filter pass could not run.
pub fn detect_freezes<T: MediaToolchain + ?Sized>(
    toolchain: &T,
    path: &Path,
    options: &FreezeDetectOptions,
    duration_sec: f64,
) -> Result<Vec<DefectEvent>, ScanError> {
    log::debug!("Running freezedetect on {}", path.display());
    let diagnostics = toolchain.run_scene_filter(path, &SceneFilter::Freeze(options.clone()))?;
    let stream_end = (duration_sec > 0.0).then_some(duration_sec);
    let events = parse_freeze_events(&diagnostics, options, stream_end);
    log::info!("freezedetect: {} segment(s) in {}", events.len(), path.display());
    Ok(events)
}

/// Parse `freezedetect` diagnostic output.
///
/// A start overrides any earlier unmatched start. An end with no pending
/// start, or a marker whose value does not parse, is skipped.
///
/// ```
/// use vidscan::{FreezeDetectOptions, parse_freeze_events};
///
/// let text = "freeze_start: 20\nfreeze_end: 26\nfreeze_start: 50\n";
/// let options = FreezeDetectOptions::default();
///
/// assert_eq!(parse_freeze_events(text, &options, None).len(), 1);
/// assert_eq!(parse_freeze_events(text, &options, Some(60.0)).len(), 2);
/// ```
pub fn parse_freeze_events(
    diagnostics: &str,
    options: &FreezeDetectOptions,
    stream_end: Option<f64>,
) -> Vec<DefectEvent> {
    let mut events = Vec::new();
    let mut pending_start: Option<f64> = None;

    for line in diagnostics.lines() {
        if line.contains(START_MARKER) {
            pending_start = marker_value(line, START_MARKER);
            if pending_start.is_none() {
                log::debug!("Skipping unusable freezedetect line: {}", line.trim());
            }
        } else if line.contains(END_MARKER) {
            let Some(start) = pending_start.take() else {
                continue;
            };
            match marker_value(line, END_MARKER) {
                Some(end) => events.extend(DefectEvent::sustained(
                    DefectKind::Freeze,
                    start,
                    end,
                    options.min_duration,
                    "frozen frame",
                )),
                None => log::debug!("Skipping unusable freezedetect line: {}", line.trim()),
            }
        }
    }

    if let Some(start) = pending_start {
        match stream_end {
            Some(end) => events.extend(DefectEvent::sustained(
                DefectKind::Freeze,
                start,
                end,
                options.min_duration,
                "frozen frame (end)",
            )),
            None => log::debug!("Dropping freeze from {start}s: no end and unknown duration"),
        }
    }

    events
}

fn marker_value(line: &str, marker: &str) -> Option<f64> {
    let (_, rest) = line.split_once(marker)?;
    rest.split_whitespace().next()?.parse().ok()
}
