//! Hysteresis span tracking.
//!
//! Turns a stream of per-frame yes/no classifications into sustained spans.
//! A span opens on the first anomalous observation and closes on the first
//! clean one; spans shorter than the minimum duration are discarded. A span
//! still open when the stream ends is closed at the stream end and reported
//! if it is long enough.
//!
//! Positions are plain seconds, so the same tracker serves a detector that
//! decodes every frame and one that samples once per second.
//!
//! # Example
//!
//! ```
//! use vidscan::sustained_spans;
//!
//! // One observation per second: anomalous from t=2 to t=14.
//! let observations = (0..20).map(|t| (t as f64, (2..14).contains(&t)));
//! let spans = sustained_spans(observations, 20.0, 10.0);
//! assert_eq!(spans.len(), 1);
//! assert_eq!((spans[0].start, spans[0].end), (2.0, 14.0));
//! ```

use crate::event::meets_minimum;

/// A closed anomalous span in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    /// Position of the first anomalous observation.
    pub start: f64,
    /// Position of the first clean observation, or the stream end.
    pub end: f64,
}

impl Span {
    /// `end - start`.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Two-state (clean / anomalous) tracker with a minimum span length.
#[derive(Debug, Clone)]
pub struct SpanTracker {
    min_duration: f64,
    open_since: Option<f64>,
}

impl SpanTracker {
    /// Create a tracker that only reports spans of at least `min_duration` seconds.
    pub fn new(min_duration: f64) -> Self {
        Self {
            min_duration,
            open_since: None,
        }
    }

    /// Feed one classification at `position` seconds.
    ///
    /// Returns a span when this observation closes one that is long enough.
    pub fn observe(&mut self, position: f64, anomalous: bool) -> Option<Span> {
        match (self.open_since, anomalous) {
            (None, true) => {
                self.open_since = Some(position);
                None
            }
            (Some(start), false) => {
                self.open_since = None;
                self.qualify(start, position)
            }
            _ => None,
        }
    }

    /// Close any open span at `end` seconds.
    pub fn finish(&mut self, end: f64) -> Option<Span> {
        let start = self.open_since.take()?;
        self.qualify(start, end.max(start))
    }

    /// Returns `true` while inside an anomalous span.
    pub fn is_open(&self) -> bool {
        self.open_since.is_some()
    }

    fn qualify(&self, start: f64, end: f64) -> Option<Span> {
        let span = Span { start, end };
        meets_minimum(span.duration(), self.min_duration).then_some(span)
    }
}

/// Collect every sustained span from `(position, anomalous)` observations.
///
/// An open span is flushed at `stream_end`.
pub fn sustained_spans<I>(observations: I, stream_end: f64, min_duration: f64) -> Vec<Span>
where
    I: IntoIterator<Item = (f64, bool)>,
{
    let mut tracker = SpanTracker::new(min_duration);
    let mut spans: Vec<Span> = observations
        .into_iter()
        .filter_map(|(position, anomalous)| tracker.observe(position, anomalous))
        .collect();
    spans.extend(tracker.finish(stream_end));
    spans
}
