//! Interval merging and damage coverage.
//!
//! Detectors run independently, so a black stretch and a color glitch can
//! cover the same seconds. Summing event durations double counts that
//! overlap. [`Coverage`] keeps both numbers: the raw sum, and the length of
//! the deduplicated union that the damage percentage is based on.
//!
//! # Example
//!
//! ```
//! use vidscan::{TimeInterval, merge_intervals};
//!
//! let merged = merge_intervals(&[
//!     TimeInterval::new(10.0, 15.0),
//!     TimeInterval::new(0.0, 12.0),
//!     TimeInterval::new(20.0, 26.0),
//! ]);
//! assert_eq!(merged, vec![TimeInterval::new(0.0, 15.0), TimeInterval::new(20.0, 26.0)]);
//! ```

use serde::Serialize;

use crate::event::DefectEvent;

/// A closed time range `[start, end]` in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeInterval {
    /// Start in seconds.
    pub start: f64,
    /// End in seconds, never less than `start`.
    pub end: f64,
}

impl TimeInterval {
    /// Build an interval, swapping the bounds if they are reversed.
    pub fn new(start: f64, end: f64) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    /// `end - start`.
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

impl From<&DefectEvent> for TimeInterval {
    fn from(event: &DefectEvent) -> Self {
        TimeInterval::new(event.start_sec(), event.end_sec())
    }
}

/// Merge overlapping or touching intervals.
///
/// The output is sorted by start and pairwise disjoint. Intervals that only
/// touch (`a.end == b.start`) are merged, following the closed-interval
/// convention. Input order does not matter.
pub fn merge_intervals(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut sorted: Vec<TimeInterval> = intervals
        .iter()
        .copied()
        .filter(|interval| interval.start.is_finite() && interval.end.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Total length covered by `intervals`, counting overlap once.
pub fn union_length(intervals: &[TimeInterval]) -> f64 {
    merge_intervals(intervals)
        .iter()
        .map(TimeInterval::length)
        .sum()
}

/// Percentage of `duration_sec` covered by `covered_sec`.
///
/// Returns 0 when the duration is unknown (zero or negative) and never
/// more than 100.
pub fn damage_percent(covered_sec: f64, duration_sec: f64) -> f64 {
    if duration_sec > 0.0 && duration_sec.is_finite() {
        (covered_sec / duration_sec * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Coverage figures for a set of events on one video's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    /// Deduplicated, sorted defect intervals.
    pub merged: Vec<TimeInterval>,
    /// Sum of individual event durations; overlapping events count twice.
    pub total_raw_defect_sec: f64,
    /// Length of the union of all events.
    pub covered_sec: f64,
    /// `covered_sec` as a percentage of the video duration.
    pub damage_percent: f64,
}

impl Coverage {
    /// Compute coverage for `events` on a timeline of `duration_sec`.
    pub fn compute(events: &[DefectEvent], duration_sec: f64) -> Self {
        let intervals: Vec<TimeInterval> = events.iter().map(TimeInterval::from).collect();
        let merged = merge_intervals(&intervals);
        let covered_sec: f64 = merged.iter().map(TimeInterval::length).sum();
        let total_raw_defect_sec: f64 = events.iter().map(DefectEvent::duration_sec).sum();

        Self {
            merged,
            total_raw_defect_sec,
            covered_sec,
            damage_percent: damage_percent(covered_sec, duration_sec),
        }
    }
}
