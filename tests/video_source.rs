//! Decoder-backed tests.
//!
//! Tests that read video need `tests/fixtures/sample_video.mp4` and are
//! skipped when it is absent. Any short clip works, for example:
//!
//! ```text
//! ffmpeg -f lavfi -i testsrc=duration=5:size=320x240:rate=30 \
//!        -f lavfi -i sine=frequency=1000:duration=5 -shortest \
//!        tests/fixtures/sample_video.mp4
//! ```

use std::path::Path;

use vidscan::{
    FfmpegCli, GlitchOptions, ScanError, ScanOptions, StripeOptions, VideoSource,
    detect_glitches, detect_stripes, probe_duration,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn fixture() -> Option<&'static Path> {
    let path = Path::new(SAMPLE_VIDEO);
    path.exists().then_some(path)
}

#[test]
fn open_nonexistent_file() {
    let result = VideoSource::open("this_file_does_not_exist.mp4");
    let error = result.expect_err("open should fail");
    assert!(
        error.to_string().contains("Failed to open media file"),
        "Error message should mention file open failure: {error}",
    );
}

#[test]
fn open_invalid_file() {
    let temporary_directory = tempfile::tempdir().expect("Failed to create temp dir");
    let invalid_file_path = temporary_directory.path().join("invalid.mp4");
    std::fs::write(&invalid_file_path, b"this is not a media file")
        .expect("Failed to write invalid file");

    assert!(VideoSource::open(&invalid_file_path).is_err());
}

#[test]
fn detectors_report_open_failure() {
    let missing = Path::new("this_file_does_not_exist.mp4");
    let options = ScanOptions::default();

    assert!(matches!(
        detect_glitches(missing, &GlitchOptions::default(), &options),
        Err(ScanError::FileOpen { .. })
    ));
    assert!(matches!(
        detect_stripes(missing, &StripeOptions::default(), &options),
        Err(ScanError::FileOpen { .. })
    ));
}

#[test]
fn metadata_is_populated() {
    let Some(path) = fixture() else { return };

    let source = VideoSource::open(path).expect("Failed to open fixture");
    let metadata = source.metadata();
    assert!(metadata.width > 0 && metadata.height > 0);
    assert!(metadata.frames_per_second > 0.0);
    assert!(metadata.frame_count > 0);
    assert_eq!(source.path(), path);
}

#[test]
fn frames_are_decoded_in_order() {
    let Some(path) = fixture() else { return };

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    let (width, height) = (source.metadata().width, source.metadata().height);
    let frame_count = source.frame_count();

    let mut decoded = 0u64;
    for frame in source.frames().expect("Failed to start decoding") {
        let frame = frame.expect("Failed to decode frame");
        assert_eq!(frame.dimensions(), (width, height));
        decoded += 1;
    }
    assert!(decoded > 0);
    // Container frame counts are estimates for some formats.
    assert!(decoded.abs_diff(frame_count) <= 2, "decoded {decoded} of {frame_count}");
}

#[test]
fn sample_frame_seeks() {
    let Some(path) = fixture() else { return };

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    let middle = source.frame_count() / 2;
    let frame = source.sample_frame(middle).expect("Failed to sample frame");
    assert_eq!(frame.width(), source.metadata().width);

    let first = source.sample_frame(0).expect("Failed to seek back");
    assert_eq!(first.height(), source.metadata().height);
}

#[test]
fn sample_frame_out_of_range() {
    let Some(path) = fixture() else { return };

    let mut source = VideoSource::open(path).expect("Failed to open fixture");
    let error = source.sample_frame(999_999).expect_err("frame should be out of range");
    assert!(
        error.to_string().contains("out of range"),
        "Error message should mention out of range: {error}",
    );
}

#[test]
fn test_pattern_has_no_sustained_defects() {
    let Some(path) = fixture() else { return };

    let options = ScanOptions::default();
    let glitches =
        detect_glitches(path, &GlitchOptions::default(), &options).expect("glitch scan");
    let stripes = detect_stripes(path, &StripeOptions::default(), &options).expect("stripe scan");
    // The clip is shorter than the 10 s minimum.
    assert!(glitches.is_empty());
    assert!(stripes.is_empty());
}

#[test]
fn duration_from_probe_or_decoder() {
    let Some(path) = fixture() else { return };

    let seconds = probe_duration(&FfmpegCli::new(), path);
    assert!(seconds > 0.0);
}
