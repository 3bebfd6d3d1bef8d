//! Report formatting and table row tests.

use vidscan::{
    DefectEvent, DefectKind, DetectorIssue, VideoAnalysisResult, format_hms, format_mmss,
    parse_timecode,
};

fn sample_result() -> VideoAnalysisResult {
    let events = vec![
        DefectEvent::new(DefectKind::Black, 0.0, 12.0, "black screen").unwrap(),
        DefectEvent::new(DefectKind::Glitch, 10.0, 15.456, "green/pink/oversaturated anomaly")
            .unwrap(),
        DefectEvent::new(DefectKind::Freeze, 20.0, 26.0, "frozen frame").unwrap(),
    ];
    VideoAnalysisResult::from_events("tape_01.mp4", 3725.0, events)
}

// ── Timestamps ─────────────────────────────────────────────────────

#[test]
fn hms_rounds_to_whole_seconds() {
    assert_eq!(format_hms(59.4), "0:00:59");
    assert_eq!(format_hms(59.6), "0:01:00");
    assert_eq!(format_hms(36_000.0), "10:00:00");
}

#[test]
fn hms_rounds_halves_to_even() {
    assert_eq!(format_hms(2.5), "0:00:02");
    assert_eq!(format_hms(3.5), "0:00:04");
}

#[test]
fn hms_clamps_negative_and_invalid() {
    assert_eq!(format_hms(-5.0), "0:00:00");
    assert_eq!(format_hms(f64::NAN), "0:00:00");
}

#[test]
fn mmss_keeps_counting_minutes() {
    assert_eq!(format_mmss(0.0), "00:00");
    assert_eq!(format_mmss(59.0), "00:59");
    assert_eq!(format_mmss(6000.0), "100:00");
}

#[test]
fn timecode_parsing() {
    assert_eq!(parse_timecode("0:00:12"), Some(12.0));
    assert_eq!(parse_timecode("01:30"), Some(90.0));
    assert_eq!(parse_timecode(" 7.25 "), Some(7.25));
    assert_eq!(parse_timecode(""), None);
    assert_eq!(parse_timecode("1:2:3:4"), None);
}

#[test]
fn formatted_timecode_parses_back() {
    for seconds in [0.0, 12.0, 61.0, 3725.0, 90_061.0] {
        assert_eq!(parse_timecode(&format_hms(seconds)), Some(seconds));
    }
}

// ── Rows ───────────────────────────────────────────────────────────

#[test]
fn event_rows_follow_event_order() {
    let rows = sample_result().event_rows();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[1].video_file, "tape_01.mp4");
    assert_eq!(rows[1].kind, DefectKind::Glitch);
    assert_eq!(rows[1].start_time, "0:00:10");
    assert_eq!(rows[1].end_time, "0:00:15");
    assert_eq!(rows[1].duration_sec, 5.46);
    assert_eq!(rows[1].details, "green/pink/oversaturated anomaly");
}

#[test]
fn summary_row_columns() {
    let row = sample_result().summary_row();
    assert_eq!(row.video_file, "tape_01.mp4");
    assert_eq!(row.video_duration_sec, 3725.0);
    assert_eq!(row.video_duration_mmss, "62:05");
    assert_eq!(row.errors_count, 3);
    assert_eq!(row.errors_total_sec, 23.46);
    assert_eq!(row.errors_total_mmss, "00:23");
    assert_eq!(row.damage_percent, 0.58);
}

#[test]
fn summary_row_serializes_with_table_headers() {
    let value = serde_json::to_value(sample_result().summary_row()).unwrap();
    for column in [
        "video_file",
        "video_duration_sec",
        "video_duration_mmss",
        "errors_count",
        "errors_total_sec",
        "errors_total_mmss",
        "damage_percent",
    ] {
        assert!(value.get(column).is_some(), "missing column {column}");
    }

    let event = serde_json::to_value(&sample_result().event_rows()[0]).unwrap();
    assert_eq!(event["type"], "BLACK");
    assert_eq!(event["start_time"], "0:00:00");
}

#[test]
fn summary_line_reports_union_and_raw_totals() {
    let line = sample_result().summary_line();
    assert_eq!(
        line,
        "3 defect(s), total 0:00:23 (= 23 sec), covered 0:00:21 of 1:02:05; damage 0.58%"
    );
}

#[test]
fn issues_are_attached_and_counted() {
    let result = sample_result().with_issues(vec![DetectorIssue::new(
        DefectKind::Tone,
        "Failed to run ffmpeg: not found",
    )]);
    assert!(result.is_partial());
    assert_eq!(result.issues()[0].detector, DefectKind::Tone);
    assert_eq!(result.count_of(DefectKind::Black), 1);
    assert_eq!(result.count_of(DefectKind::Stripe), 0);
}

#[test]
fn reversed_event_is_rejected() {
    assert!(DefectEvent::new(DefectKind::Stripe, 10.0, 9.0, "reversed").is_none());
    assert!(DefectEvent::new(DefectKind::Stripe, 0.0, f64::INFINITY, "open").is_none());
    let instant = DefectEvent::new(DefectKind::Tone, 3.0, 3.0, "instant").unwrap();
    assert_eq!(instant.duration_sec(), 0.0);
}
