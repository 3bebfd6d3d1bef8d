//! Hysteresis span tracking tests.

use vidscan::{Span, SpanTracker, sustained_spans};

/// One observation per second, anomalous where `anomalous(t)` holds.
fn per_second(seconds: u32, anomalous: impl Fn(u32) -> bool) -> Vec<(f64, bool)> {
    (0..seconds).map(|t| (f64::from(t), anomalous(t))).collect()
}

#[test]
fn short_run_is_discarded() {
    let spans = sustained_spans(per_second(30, |t| (5..12).contains(&t)), 30.0, 10.0);
    assert!(spans.is_empty(), "7 s run should not qualify: {spans:?}");
}

#[test]
fn run_at_minimum_is_reported() {
    let spans = sustained_spans(per_second(30, |t| (5..15).contains(&t)), 30.0, 10.0);
    assert_eq!(spans, vec![Span { start: 5.0, end: 15.0 }]);
}

#[test]
fn separate_runs_are_separate_spans() {
    let spans = sustained_spans(
        per_second(60, |t| (0..12).contains(&t) || (30..45).contains(&t)),
        60.0,
        10.0,
    );
    assert_eq!(
        spans,
        vec![Span { start: 0.0, end: 12.0 }, Span { start: 30.0, end: 45.0 }]
    );
}

#[test]
fn open_span_is_flushed_at_stream_end() {
    let spans = sustained_spans(per_second(40, |t| t >= 25), 40.0, 10.0);
    assert_eq!(spans, vec![Span { start: 25.0, end: 40.0 }]);
}

#[test]
fn short_open_span_is_not_flushed() {
    let spans = sustained_spans(per_second(40, |t| t >= 35), 40.0, 10.0);
    assert!(spans.is_empty());
}

#[test]
fn single_clean_frame_closes_span() {
    // Anomalous 0..20 with a single clean observation at t=10.
    let spans = sustained_spans(per_second(20, |t| t != 10), 20.0, 5.0);
    assert_eq!(
        spans,
        vec![Span { start: 0.0, end: 10.0 }, Span { start: 11.0, end: 20.0 }]
    );
}

#[test]
fn tracker_state_transitions() {
    let mut tracker = SpanTracker::new(2.0);
    assert!(!tracker.is_open());

    assert_eq!(tracker.observe(1.0, true), None);
    assert!(tracker.is_open());
    assert_eq!(tracker.observe(2.0, true), None);
    assert_eq!(tracker.observe(4.0, false), Some(Span { start: 1.0, end: 4.0 }));
    assert!(!tracker.is_open());

    assert_eq!(tracker.finish(10.0), None);
}

#[test]
fn finish_before_start_is_clamped() {
    let mut tracker = SpanTracker::new(0.0);
    tracker.observe(5.0, true);
    let span = tracker.finish(3.0).expect("zero-length span qualifies at minimum 0");
    assert_eq!(span.duration(), 0.0);
}

#[test]
fn span_of_exactly_minimum_length_qualifies() {
    // 16.08 - 6.08 rounds to just below 10.
    let mut tracker = SpanTracker::new(10.0);
    tracker.observe(6.08, true);
    assert_eq!(tracker.observe(16.08, false), Some(Span { start: 6.08, end: 16.08 }));

    tracker.observe(6.08, true);
    assert!(tracker.finish(16.08).is_some());
}
