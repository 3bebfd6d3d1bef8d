//! Defect events.
//!
//! A [`DefectEvent`] is one time-bounded anomaly reported by a detector.
//! Events are only ever built once a span has met its detector's minimum
//! duration, so every event that exists is reportable.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;

/// Slack allowed when comparing a span length against a minimum duration.
///
/// Span bounds arrive as decimal timestamps or `index / fps` quotients, so
/// their difference can land a few ulps below an exact minimum.
const DURATION_TOLERANCE: f64 = 1e-9;

/// Returns `true` if `duration` seconds reaches `min_duration`, allowing
/// for rounding in the subtraction that produced it.
pub(crate) fn meets_minimum(duration: f64, min_duration: f64) -> bool {
    duration + DURATION_TOLERANCE >= min_duration
}

/// The detector that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefectKind {
    /// Picture is (almost) entirely black.
    Black,
    /// Picture does not change.
    Freeze,
    /// Mean color is green-dominant, pink-cast, or oversaturated.
    Glitch,
    /// The 1 kHz calibration tone is present on the audio track.
    Tone,
    /// Picture is gray with noise or vertical stripes.
    Stripe,
}

impl DefectKind {
    /// Upper-case label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            DefectKind::Black => "BLACK",
            DefectKind::Freeze => "FREEZE",
            DefectKind::Glitch => "GLITCH",
            DefectKind::Tone => "TONE",
            DefectKind::Stripe => "STRIPE",
        }
    }
}

impl Display for DefectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

/// A detected defect spanning `[start_sec, end_sec]`.
///
/// # Example
///
/// ```
/// use vidscan::{DefectEvent, DefectKind};
///
/// let event = DefectEvent::new(DefectKind::Black, 0.0, 12.0, "black screen").unwrap();
/// assert_eq!(event.duration_sec(), 12.0);
/// assert!(DefectEvent::new(DefectKind::Black, 5.0, 1.0, "reversed").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectEvent {
    #[serde(rename = "type")]
    kind: DefectKind,
    start_sec: f64,
    end_sec: f64,
    details: String,
}

impl DefectEvent {
    /// Build an event. Returns `None` when the bounds are not finite or
    /// `end_sec < start_sec`.
    pub fn new(
        kind: DefectKind,
        start_sec: f64,
        end_sec: f64,
        details: impl Into<String>,
    ) -> Option<Self> {
        if !start_sec.is_finite() || !end_sec.is_finite() || end_sec < start_sec {
            return None;
        }
        Some(Self {
            kind,
            start_sec,
            end_sec,
            details: details.into(),
        })
    }

    /// Build an event only if it lasts at least `min_duration` seconds.
    pub(crate) fn sustained(
        kind: DefectKind,
        start_sec: f64,
        end_sec: f64,
        min_duration: f64,
        details: impl Into<String>,
    ) -> Option<Self> {
        Self::new(kind, start_sec, end_sec, details)
            .filter(|event| meets_minimum(event.duration_sec(), min_duration))
    }

    /// Which detector produced the event.
    pub fn kind(&self) -> DefectKind {
        self.kind
    }

    /// Start of the defect in seconds.
    pub fn start_sec(&self) -> f64 {
        self.start_sec
    }

    /// End of the defect in seconds.
    pub fn end_sec(&self) -> f64 {
        self.end_sec
    }

    /// `end_sec - start_sec`.
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Human-readable description from the detector.
    pub fn details(&self) -> &str {
        &self.details
    }
}
