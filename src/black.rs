//! Black-segment detection.
//!
//! Runs FFmpeg's `blackdetect` filter and turns each reported
//! `black_start` / `black_end` / `black_duration` triple into a
//! [`DefectKind::Black`] event. A line FFmpeg prints looks like:
//!
//! ```text
//! [blackdetect @ 0x5581c0] black_start:0 black_end:12.48 black_duration:12.48
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::BlackDetectOptions;
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind, meets_minimum};
use crate::toolchain::{MediaToolchain, SceneFilter};

static BLACK_TRIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"black_start:\s*(\S+)\s+black_end:\s*(\S+)\s+black_duration:\s*(\S+)",
    )
    .expect("black triple pattern is valid")
});

/// Run `blackdetect` on `path` and return the black segments found.
///
/// # Errors
///
/// Returns the toolchain's error if the filter pass could not run. A pass
/// that ran and found nothing returns an empty vector.
pub fn detect_black<T: MediaToolchain + ?Sized>(
    toolchain: &T,
    path: &Path,
    options: &BlackDetectOptions,
) -> Result<Vec<DefectEvent>, ScanError> {
    log::debug!("Running blackdetect on {}", path.display());
    let diagnostics = toolchain.run_scene_filter(path, &SceneFilter::Black(options.clone()))?;
    let events = parse_black_events(&diagnostics, options);
    log::info!("blackdetect: {} segment(s) in {}", events.len(), path.display());
    Ok(events)
}

/// Parse `blackdetect` diagnostic output.
///
/// Lines without a `black_start` marker are ignored. Lines that mention
/// one but do not hold three numbers, or hold a reversed or too-short
/// range, are skipped individually.
///
/// ```
/// use vidscan::{BlackDetectOptions, parse_black_events};
///
/// let text = "[blackdetect @ 0x1] black_start:0 black_end:12 black_duration:12\n";
/// let events = parse_black_events(text, &BlackDetectOptions::default());
/// assert_eq!(events.len(), 1);
/// ```
pub fn parse_black_events(diagnostics: &str, options: &BlackDetectOptions) -> Vec<DefectEvent> {
    diagnostics
        .lines()
        .filter(|line| line.contains("black_start"))
        .filter_map(|line| {
            let event = parse_black_line(line, options);
            if event.is_none() {
                log::debug!("Skipping unusable blackdetect line: {}", line.trim());
            }
            event
        })
        .collect()
}

fn parse_black_line(line: &str, options: &BlackDetectOptions) -> Option<DefectEvent> {
    let captures = BLACK_TRIPLE.captures(line)?;
    let start: f64 = captures[1].parse().ok()?;
    let end: f64 = captures[2].parse().ok()?;
    let reported: f64 = captures[3].parse().ok()?;
    if !meets_minimum(reported, options.min_duration) {
        return None;
    }
    DefectEvent::new(DefectKind::Black, start, end, "black screen")
}
