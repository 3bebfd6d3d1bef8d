//! Frame-level classifier tests for the glitch and stripe detectors.
//!
//! Frames are synthesized with `image::RgbImage`; no media files are
//! required.

use image::{Rgb, RgbImage};
use vidscan::{
    ColorMeans, DefectKind, GlitchOptions, ScanError, StripeOptions, StripeScore,
    is_glitch_frame, scan_glitches, scan_stripes,
};

fn solid(r: u8, g: u8, b: u8) -> RgbImage {
    RgbImage::from_pixel(32, 18, Rgb([r, g, b]))
}

/// Gray pixels from a fixed linear congruential sequence.
fn gray_noise(width: u32, height: u32) -> RgbImage {
    let mut state: u32 = 12_345;
    RgbImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let value = (state >> 16) as u8;
        Rgb([value, value, value])
    })
}

/// Alternating black and white vertical bars `bar` pixels wide.
fn vertical_bars(width: u32, height: u32, bar: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, _| {
        let value = if (x / bar) % 2 == 0 { 0 } else { 255 };
        Rgb([value, value, value])
    })
}

// ── Glitch classifier ──────────────────────────────────────────────

#[test]
fn green_dominant_frame_is_glitch() {
    assert!(is_glitch_frame(&solid(40, 200, 40), &GlitchOptions::default()));
}

#[test]
fn pink_cast_frame_is_glitch() {
    assert!(is_glitch_frame(&solid(200, 100, 200), &GlitchOptions::default()));
}

#[test]
fn oversaturated_frame_is_glitch() {
    assert!(is_glitch_frame(&solid(240, 240, 240), &GlitchOptions::default()));
    assert!(is_glitch_frame(&solid(20, 20, 235), &GlitchOptions::default()));
}

#[test]
fn ordinary_frames_are_clean() {
    let options = GlitchOptions::default();
    assert!(!is_glitch_frame(&solid(128, 128, 128), &options));
    assert!(!is_glitch_frame(&solid(0, 0, 0), &options));
    assert!(!is_glitch_frame(&solid(90, 170, 80), &options));
    // Bright green but not above the red channel.
    assert!(!is_glitch_frame(&solid(200, 190, 60), &options));
}

#[test]
fn crop_excludes_top_overlay() {
    // Top 7 of 8 rows white, bottom row mid gray.
    let frame = RgbImage::from_fn(16, 8, |_, y| {
        if y < 7 { Rgb([255, 255, 255]) } else { Rgb([100, 100, 100]) }
    });

    assert!(is_glitch_frame(&frame, &GlitchOptions::default()));
    assert!(!is_glitch_frame(&frame, &GlitchOptions::new().crop_top_ratio(0.875)));
}

#[test]
fn full_crop_falls_back_to_whole_frame() {
    let means = ColorMeans::of_frame(&solid(10, 20, 30), 1.0).expect("non-empty frame");
    assert_eq!((means.red, means.green, means.blue), (10.0, 20.0, 30.0));
}

#[test]
fn empty_frame_has_no_means() {
    assert!(ColorMeans::of_frame(&RgbImage::new(0, 0), 0.0).is_none());
    assert!(!is_glitch_frame(&RgbImage::new(0, 0), &GlitchOptions::default()));
}

// ── Glitch scan ────────────────────────────────────────────────────

fn glitch_stream(
    count: usize,
    anomalous: impl Fn(usize) -> bool,
) -> Vec<Result<RgbImage, ScanError>> {
    (0..count)
        .map(|i| {
            Ok(if anomalous(i) {
                solid(40, 200, 40)
            } else {
                solid(100, 100, 100)
            })
        })
        .collect()
}

#[test]
fn sustained_glitch_becomes_event() {
    // 10 fps: anomalous from frame 50 to 199 is 15 seconds.
    let frames = glitch_stream(300, |i| (50..200).contains(&i));
    let events = scan_glitches(frames, 10.0, &GlitchOptions::default());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), DefectKind::Glitch);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (5.0, 20.0));
    assert_eq!(events[0].details(), "green/pink/oversaturated anomaly");
}

#[test]
fn glitch_of_exactly_minimum_length_is_kept() {
    // 24 fps: frames 194..434 are 240 frames, 10 s, though 434/24 - 194/24 < 10.
    let frames = glitch_stream(600, |i| (194..434).contains(&i));
    let events = scan_glitches(frames, 24.0, &GlitchOptions::default());
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].details(), "green/pink/oversaturated anomaly");
}

#[test]
fn brief_glitch_is_ignored() {
    let frames = glitch_stream(300, |i| (50..100).contains(&i));
    assert!(scan_glitches(frames, 10.0, &GlitchOptions::default()).is_empty());
}

#[test]
fn glitch_open_at_end_is_flushed() {
    let frames = glitch_stream(300, |i| i >= 200);
    let events = scan_glitches(frames, 10.0, &GlitchOptions::default());

    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (20.0, 30.0));
    assert_eq!(events[0].details(), "green/pink/oversaturated anomaly (end)");
}

#[test]
fn decode_error_ends_scan_early() {
    let mut frames = glitch_stream(150, |_| true);
    frames.push(Err(ScanError::VideoDecodeError("corrupt packet".to_string())));
    frames.extend(glitch_stream(100, |_| false));

    let events = scan_glitches(frames, 10.0, &GlitchOptions::default());
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (0.0, 15.0));
}

#[test]
fn glitch_scan_without_frame_rate_is_empty() {
    let frames = glitch_stream(10, |_| true);
    assert!(scan_glitches(frames, 0.0, &GlitchOptions::default()).is_empty());
}

// ── Stripe classifier ──────────────────────────────────────────────

#[test]
fn gray_noise_is_defective() {
    let score = StripeScore::of_frame(&gray_noise(64, 48), 480);
    assert_eq!(score.saturation, 0.0);
    assert!(score.noise >= 120.0, "noise score {}", score.noise);
    assert!(score.is_defective(&StripeOptions::default()));
}

#[test]
fn gray_stripes_are_defective() {
    let score = StripeScore::of_frame(&vertical_bars(64, 48, 4), 480);
    assert!(score.stripe >= 10.0, "stripe score {}", score.stripe);
    assert!(score.is_defective(&StripeOptions::default()));
}

#[test]
fn flat_gray_is_clean() {
    let score = StripeScore::of_frame(&solid(128, 128, 128), 480);
    assert_eq!(score.noise, 0.0);
    assert_eq!(score.stripe, 0.0);
    assert!(!score.is_defective(&StripeOptions::default()));
}

#[test]
fn colorful_noise_is_clean() {
    let mut state: u32 = 99;
    let frame = RgbImage::from_fn(64, 48, |x, _| {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let value = (state >> 16) as u8 / 2;
        if x % 2 == 0 { Rgb([255, value, 0]) } else { Rgb([0, value, 255]) }
    });

    let score = StripeScore::of_frame(&frame, 480);
    assert!(score.saturation > 40.0, "saturation {}", score.saturation);
    assert!(!score.is_defective(&StripeOptions::default()));
}

#[test]
fn saturation_uses_full_scale() {
    let score = StripeScore::of_frame(&solid(255, 0, 0), 480);
    assert_eq!(score.saturation, 255.0);
}

#[test]
fn tall_frames_are_downscaled_before_scoring() {
    let score = StripeScore::of_frame(&vertical_bars(960, 720, 12), 480);
    assert!(score.stripe >= 10.0, "stripe score {}", score.stripe);
}

#[test]
fn single_pixel_frame_scores_zero_texture() {
    let score = StripeScore::of_frame(&RgbImage::from_pixel(1, 1, Rgb([80, 80, 80])), 480);
    assert_eq!(score.noise, 0.0);
    assert_eq!(score.stripe, 0.0);
}

// ── Stripe scan ────────────────────────────────────────────────────

fn stripe_samples(
    seconds: u32,
    defective: impl Fn(u32) -> bool,
) -> Vec<(f64, Result<RgbImage, ScanError>)> {
    (0..seconds)
        .map(|t| {
            let frame = if defective(t) {
                gray_noise(32, 24)
            } else {
                solid(90, 140, 60)
            };
            (f64::from(t), Ok(frame))
        })
        .collect()
}

#[test]
fn sustained_stripes_become_event() {
    let samples = stripe_samples(40, |t| (5..20).contains(&t));
    let events = scan_stripes(samples, 40.0, &StripeOptions::default());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), DefectKind::Stripe);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (5.0, 20.0));
    assert!(events[0].details().starts_with("gray+noisy/striped (S≤40"));
}

#[test]
fn stripes_open_at_end_are_flushed() {
    let samples = stripe_samples(40, |t| t >= 28);
    let events = scan_stripes(samples, 40.0, &StripeOptions::default());

    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (28.0, 40.0));
    assert_eq!(events[0].details(), "gray+noisy/striped (end)");
}

#[test]
fn failed_sample_closes_span_at_its_position() {
    let mut samples = stripe_samples(25, |_| true);
    samples.push((25.0, Err(ScanError::VideoDecodeError("seek failed".to_string()))));

    let events = scan_stripes(samples, 60.0, &StripeOptions::default());
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].start_sec(), events[0].end_sec()), (0.0, 25.0));
}

#[test]
fn stride_follows_frame_rate() {
    let options = StripeOptions::default();
    assert_eq!(options.stride(25.0), 25);
    assert_eq!(options.stride(29.97), 30);
    assert_eq!(options.stride(0.5), 1);
    assert_eq!(StripeOptions::new().samples_per_second(0.0).stride(25.0), 250);
}
