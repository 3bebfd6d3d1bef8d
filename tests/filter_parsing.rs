//! Scene filter output parsing tests.
//!
//! The diagnostic text below mimics what `ffmpeg -vf blackdetect` and
//! `ffmpeg -vf freezedetect` write to stderr.

use vidscan::{
    BlackDetectOptions, DefectKind, FreezeDetectOptions, SceneFilter, parse_black_events,
    parse_freeze_events,
};

const BLACK_OUTPUT: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'tape_01.mp4':
  Duration: 00:01:00.00, start: 0.000000, bitrate: 1205 kb/s
[blackdetect @ 0x5581c0a3c0] black_start:0 black_end:12.48 black_duration:12.48
[blackdetect @ 0x5581c0a3c0] black_start:oops black_end:20 black_duration:20
[blackdetect @ 0x5581c0a3c0] black_start:40.04 black_end:55.12 black_duration:15.08
frame= 1500 fps=600 q=-0.0 Lsize=N/A time=00:01:00.00 bitrate=N/A speed=24x
";

const FREEZE_OUTPUT: &str = "\
[freezedetect @ 0x55d] lavfi.freezedetect.freeze_start: 20.02
[freezedetect @ 0x55d] lavfi.freezedetect.freeze_duration: 6.04
[freezedetect @ 0x55d] lavfi.freezedetect.freeze_end: 26.06
[freezedetect @ 0x55d] lavfi.freezedetect.freeze_start: 50.5
";

// ── blackdetect ────────────────────────────────────────────────────

#[test]
fn black_valid_lines_survive_malformed_neighbour() {
    let events = parse_black_events(BLACK_OUTPUT, &BlackDetectOptions::default());
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].kind(), DefectKind::Black);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (0.0, 12.48));
    assert_eq!((events[1].start_sec(), events[1].end_sec()), (40.04, 55.12));
    assert_eq!(events[0].details(), "black screen");
}

#[test]
fn black_short_segment_is_dropped() {
    let text = "[blackdetect @ 0x1] black_start:3 black_end:7 black_duration:4\n";
    assert!(parse_black_events(text, &BlackDetectOptions::default()).is_empty());

    let lenient = BlackDetectOptions::new().min_duration(2.0);
    assert_eq!(parse_black_events(text, &lenient).len(), 1);
}

#[test]
fn black_segment_of_exactly_minimum_length_is_kept() {
    // 16.08 - 6.08 is a hair under 10 in binary floating point.
    let text = "[blackdetect @ 0x1] black_start:6.08 black_end:16.08 black_duration:10\n";
    let events = parse_black_events(text, &BlackDetectOptions::default());
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (6.08, 16.08));
}

#[test]
fn black_truncated_line_is_skipped() {
    let text = "[blackdetect @ 0x1] black_start:3 black_end:\n";
    assert!(parse_black_events(text, &BlackDetectOptions::default()).is_empty());
}

#[test]
fn black_empty_output() {
    assert!(parse_black_events("", &BlackDetectOptions::default()).is_empty());
}

// ── freezedetect ───────────────────────────────────────────────────

#[test]
fn freeze_pairs_start_with_next_end() {
    let events = parse_freeze_events(FREEZE_OUTPUT, &FreezeDetectOptions::default(), None);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), DefectKind::Freeze);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (20.02, 26.06));
    assert_eq!(events[0].details(), "frozen frame");
}

#[test]
fn freeze_open_at_end_is_closed_at_duration() {
    let events = parse_freeze_events(FREEZE_OUTPUT, &FreezeDetectOptions::default(), Some(60.0));
    assert_eq!(events.len(), 2);
    assert_eq!((events[1].start_sec(), events[1].end_sec()), (50.5, 60.0));
    assert_eq!(events[1].details(), "frozen frame (end)");
}

#[test]
fn freeze_open_at_end_below_minimum_is_dropped() {
    let text = "lavfi.freezedetect.freeze_start: 57\n";
    let events = parse_freeze_events(text, &FreezeDetectOptions::default(), Some(60.0));
    assert!(events.is_empty());
}

#[test]
fn freeze_of_exactly_minimum_length_is_kept() {
    let text = "lavfi.freezedetect.freeze_start: 6.08\nlavfi.freezedetect.freeze_end: 16.08\n";
    let options = FreezeDetectOptions::new().min_duration(10.0);
    assert_eq!(parse_freeze_events(text, &options, None).len(), 1);

    let open = "lavfi.freezedetect.freeze_start: 6.08\n";
    assert_eq!(parse_freeze_events(open, &options, Some(16.08)).len(), 1);
}

#[test]
fn freeze_end_without_start_is_ignored() {
    let text = "lavfi.freezedetect.freeze_end: 26\nlavfi.freezedetect.freeze_start: 30\nlavfi.freezedetect.freeze_end: 40\n";
    let events = parse_freeze_events(text, &FreezeDetectOptions::default(), None);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].start_sec(), 30.0);
}

#[test]
fn freeze_later_start_replaces_unmatched_start() {
    let text = "freeze_start: 10\nfreeze_start: 30\nfreeze_end: 36\n";
    let events = parse_freeze_events(text, &FreezeDetectOptions::default(), None);
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (30.0, 36.0));
}

// ── SceneFilter ────────────────────────────────────────────────────

#[test]
fn scene_filter_arguments() {
    let black = SceneFilter::Black(BlackDetectOptions::default());
    assert_eq!(black.name(), "blackdetect");
    assert_eq!(black.filter_arg(), "blackdetect=d=10:pix_th=0.1:pic_th=0.98");

    let freeze = SceneFilter::Freeze(FreezeDetectOptions::default());
    assert_eq!(freeze.name(), "freezedetect");
    assert_eq!(freeze.filter_arg(), "freezedetect=n=0.003:d=5");
}
