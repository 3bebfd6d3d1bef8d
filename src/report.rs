//! Per-video analysis results and their tabular views.
//!
//! [`VideoAnalysisResult`] is built once per analysed file and is read-only
//! afterwards. Human-readable timestamps are derived from the numeric
//! seconds when a view is rendered; they are never stored.

use serde::Serialize;

use crate::event::{DefectEvent, DefectKind};
use crate::timeline::{Coverage, TimeInterval};

/// A detector that could not complete for a video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorIssue {
    /// The detector that failed.
    pub detector: DefectKind,
    /// Why it failed.
    pub message: String,
}

impl DetectorIssue {
    /// Record that `detector` failed with `message`.
    pub fn new(detector: DefectKind, message: impl Into<String>) -> Self {
        Self {
            detector,
            message: message.into(),
        }
    }
}

/// Everything found in one video.
///
/// Events keep the order the detectors ran in; they are not sorted by time.
///
/// # Example
///
/// ```
/// use vidscan::{DefectEvent, DefectKind, VideoAnalysisResult};
///
/// let events = vec![
///     DefectEvent::new(DefectKind::Black, 0.0, 12.0, "black screen").unwrap(),
///     DefectEvent::new(DefectKind::Glitch, 10.0, 15.0, "green/pink/oversaturated anomaly").unwrap(),
/// ];
/// let result = VideoAnalysisResult::from_events("tape_01.mp4", 60.0, events);
/// assert_eq!(result.total_raw_defect_sec(), 17.0);
/// assert_eq!(result.covered_sec(), 15.0);
/// assert_eq!(result.damage_percent(), 25.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoAnalysisResult {
    video_id: String,
    duration_sec: f64,
    events: Vec<DefectEvent>,
    merged: Vec<TimeInterval>,
    total_raw_defect_sec: f64,
    covered_sec: f64,
    damage_percent: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<DetectorIssue>,
}

impl VideoAnalysisResult {
    /// Assemble a result from the events of every detector.
    ///
    /// `duration_sec` of 0 means the duration is unknown; the damage
    /// percentage is then 0.
    pub fn from_events(video_id: impl Into<String>, duration_sec: f64, events: Vec<DefectEvent>) -> Self {
        let duration_sec = if duration_sec.is_finite() { duration_sec.max(0.0) } else { 0.0 };
        let Coverage {
            merged,
            total_raw_defect_sec,
            covered_sec,
            damage_percent,
        } = Coverage::compute(&events, duration_sec);

        Self {
            video_id: video_id.into(),
            duration_sec,
            events,
            merged,
            total_raw_defect_sec,
            covered_sec,
            damage_percent,
            issues: Vec::new(),
        }
    }

    /// Attach the detectors that failed.
    #[must_use]
    pub fn with_issues(mut self, issues: Vec<DetectorIssue>) -> Self {
        self.issues = issues;
        self
    }

    /// File name (or other identifier) of the video.
    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Video duration in seconds, 0 if unknown.
    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    /// Events in detector order.
    pub fn events(&self) -> &[DefectEvent] {
        &self.events
    }

    /// Deduplicated defect intervals, sorted by start.
    pub fn merged_intervals(&self) -> &[TimeInterval] {
        &self.merged
    }

    /// Sum of all event durations; overlapping events count twice.
    pub fn total_raw_defect_sec(&self) -> f64 {
        self.total_raw_defect_sec
    }

    /// Seconds of the timeline covered by at least one event.
    pub fn covered_sec(&self) -> f64 {
        self.covered_sec
    }

    /// `covered_sec` as a percentage of the duration, 0–100.
    pub fn damage_percent(&self) -> f64 {
        self.damage_percent
    }

    /// Detectors that could not run to completion.
    pub fn issues(&self) -> &[DetectorIssue] {
        &self.issues
    }

    /// Returns `true` if at least one detector failed.
    pub fn is_partial(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Number of events of `kind`.
    pub fn count_of(&self, kind: DefectKind) -> usize {
        self.events.iter().filter(|event| event.kind() == kind).count()
    }

    /// One-line summary for console output.
    ///
    /// ```
    /// use vidscan::VideoAnalysisResult;
    ///
    /// let result = VideoAnalysisResult::from_events("clean.mp4", 125.0, Vec::new());
    /// assert_eq!(
    ///     result.summary_line(),
    ///     "0 defect(s), total 0:00:00 (= 0 sec), covered 0:00:00 of 0:02:05; damage 0.00%"
    /// );
    /// ```
    pub fn summary_line(&self) -> String {
        format!(
            "{} defect(s), total {} (= {} sec), covered {} of {}; damage {:.2}%",
            self.events.len(),
            format_hms(self.total_raw_defect_sec),
            round_half_even(self.total_raw_defect_sec) as u64,
            format_hms(self.covered_sec),
            format_hms(self.duration_sec),
            self.damage_percent
        )
    }

    /// One row per event for the events table.
    pub fn event_rows(&self) -> Vec<EventRow> {
        self.events
            .iter()
            .map(|event| EventRow {
                video_file: self.video_id.clone(),
                kind: event.kind(),
                start_time: format_hms(event.start_sec()),
                end_time: format_hms(event.end_sec()),
                duration_sec: round_to(event.duration_sec(), 2),
                details: event.details().to_string(),
            })
            .collect()
    }

    /// The row for this video in the summary table.
    pub fn summary_row(&self) -> SummaryRow {
        SummaryRow {
            video_file: self.video_id.clone(),
            video_duration_sec: round_to(self.duration_sec, 2),
            video_duration_mmss: format_mmss(self.duration_sec),
            errors_count: self.events.len(),
            errors_total_sec: round_to(self.total_raw_defect_sec, 2),
            errors_total_mmss: format_mmss(self.total_raw_defect_sec),
            damage_percent: round_to(self.damage_percent, 2),
        }
    }
}

/// A row of the events table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRow {
    /// Video the event belongs to.
    pub video_file: String,
    /// Detector that reported it.
    #[serde(rename = "type")]
    pub kind: DefectKind,
    /// Start as `H:MM:SS`.
    pub start_time: String,
    /// End as `H:MM:SS`.
    pub end_time: String,
    /// Duration in seconds, two decimals.
    pub duration_sec: f64,
    /// Detector description.
    pub details: String,
}

/// A row of the per-video summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    /// File name of the video.
    pub video_file: String,
    /// Video duration in seconds, two decimals.
    pub video_duration_sec: f64,
    /// Video duration as `MM:SS`.
    pub video_duration_mmss: String,
    /// Number of events before merging.
    pub errors_count: usize,
    /// Raw sum of event durations.
    pub errors_total_sec: f64,
    /// Raw sum of event durations as `MM:SS`.
    pub errors_total_mmss: String,
    /// Share of the timeline covered by merged defects, two decimals.
    pub damage_percent: f64,
}

fn round_half_even(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0).round_ties_even() } else { 0.0 }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Format seconds as `H:MM:SS`, rounded to the whole second.
///
/// Hours are not padded and are not capped at 24.
///
/// ```
/// use vidscan::format_hms;
///
/// assert_eq!(format_hms(0.0), "0:00:00");
/// assert_eq!(format_hms(3725.4), "1:02:05");
/// assert_eq!(format_hms(90061.0), "25:01:01");
/// ```
pub fn format_hms(seconds: f64) -> String {
    let total = round_half_even(seconds) as u64;
    format!("{}:{:02}:{:02}", total / 3600, total % 3600 / 60, total % 60)
}

/// Format seconds as `MM:SS`, rounded to the whole second.
///
/// Minutes keep counting past 59.
///
/// ```
/// use vidscan::format_mmss;
///
/// assert_eq!(format_mmss(65.0), "01:05");
/// assert_eq!(format_mmss(3725.0), "62:05");
/// ```
pub fn format_mmss(seconds: f64) -> String {
    let total = round_half_even(seconds) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse `H:MM:SS`, `MM:SS` or plain seconds.
///
/// Returns `None` for an empty string, more than three fields, or a field
/// that is not a number.
///
/// ```
/// use vidscan::parse_timecode;
///
/// assert_eq!(parse_timecode("1:02:05"), Some(3725.0));
/// assert_eq!(parse_timecode("02:30"), Some(150.0));
/// assert_eq!(parse_timecode("12.5"), Some(12.5));
/// assert_eq!(parse_timecode("a:b"), None);
/// ```
pub fn parse_timecode(text: &str) -> Option<f64> {
    let fields = text
        .trim()
        .split(':')
        .map(|field| field.trim().parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;

    match fields.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] => Some(minutes * 60.0 + seconds),
        [hours, minutes, seconds] => Some(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => None,
    }
}
