//! Calibration-tone detection.
//!
//! The audio track is decoded to mono PCM and searched in half-overlapping
//! windows. A window whose dominant frequency lies within the tolerance of
//! the reference tone marks the video as containing a calibration tone. Only
//! the first such window is reported.

use std::path::Path;

use rustfft::{FftPlanner, num_complex::Complex};

use crate::config::{ScanOptions, ToneOptions};
use crate::error::ScanError;
use crate::event::{DefectEvent, DefectKind};
use crate::progress::OperationType;
use crate::toolchain::MediaToolchain;

/// Dominant frequency of `samples` in hertz, ignoring the DC bin.
///
/// Returns `None` for fewer than two samples or a zero sample rate.
///
/// ```
/// use vidscan::dominant_frequency;
///
/// let rate = 8_000;
/// let samples: Vec<f32> = (0..rate)
///     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin())
///     .collect();
/// let peak = dominant_frequency(&samples, rate).unwrap();
/// assert!((peak - 440.0).abs() < 1.0);
/// ```
pub fn dominant_frequency(samples: &[f32], sample_rate: u32) -> Option<f64> {
    if samples.len() < 2 || sample_rate == 0 {
        return None;
    }
    let mut planner = FftPlanner::<f32>::new();
    peak_frequency(&mut planner, samples, sample_rate)
}

fn peak_frequency(
    planner: &mut FftPlanner<f32>,
    samples: &[f32],
    sample_rate: u32,
) -> Option<f64> {
    let len = samples.len();
    let fft = planner.plan_fft_forward(len);
    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();
    fft.process(&mut buffer);

    // Ties go to the lowest bin.
    let (peak_bin, _) = buffer[1..=len / 2]
        .iter()
        .enumerate()
        .map(|(bin, value)| (bin + 1, value.norm_sqr()))
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })?;

    Some(peak_bin as f64 * f64::from(sample_rate) / len as f64)
}

/// Search `samples` for the reference tone.
///
/// Windows are `window_duration` seconds long and advance by half a window;
/// a trailing partial window is not analysed. Returns an event spanning the
/// first matching window, or `None`.
pub fn find_tone(samples: &[f32], sample_rate: u32, options: &ToneOptions) -> Option<DefectEvent> {
    find_tone_with(samples, sample_rate, options, |_| {})
}

fn find_tone_with(
    samples: &[f32],
    sample_rate: u32,
    options: &ToneOptions,
    mut on_window: impl FnMut(usize),
) -> Option<DefectEvent> {
    let window = (f64::from(sample_rate) * options.window_duration) as usize;
    if window < 2 || samples.len() < window {
        return None;
    }
    let step = (window / 2).max(1);
    let rate = f64::from(sample_rate);
    let mut planner = FftPlanner::<f32>::new();

    let mut start = 0;
    while start + window <= samples.len() {
        on_window(start);
        let frequency = peak_frequency(&mut planner, &samples[start..start + window], sample_rate)?;
        if options.matches(frequency) {
            log::debug!("Tone peak at {frequency:.1} Hz from {:.2}s", start as f64 / rate);
            return DefectEvent::new(
                DefectKind::Tone,
                start as f64 / rate,
                (start + window) as f64 / rate,
                format!("{}kHz audio tone", options.frequency / 1000.0),
            );
        }
        start += step;
    }
    None
}

/// Read the first channel of a WAV file as `f32` samples in -1.0..1.0.
///
/// # Errors
///
/// Returns [`ScanError::WavError`] if the file is not a readable WAV.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32), ScanError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 2f32.powi(i32::from(spec.bits_per_sample.max(1)) - 1);
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mono = interleaved.into_iter().step_by(channels).collect();
    Ok((mono, spec.sample_rate))
}

/// Extract the audio of `path` and search it for the reference tone.
///
/// A video without a usable audio track yields no events. The scratch WAV
/// is removed whether or not the search succeeds.
///
/// # Errors
///
/// - [`ScanError::ToolSpawn`] if FFmpeg cannot be started.
/// - [`ScanError::IoError`] if the scratch file cannot be created.
pub fn detect_tone<T: MediaToolchain + ?Sized>(
    toolchain: &T,
    path: &Path,
    options: &ToneOptions,
    scan_options: &ScanOptions,
) -> Result<Vec<DefectEvent>, ScanError> {
    let scratch = tempfile::Builder::new()
        .prefix("vidscan-audio-")
        .suffix(".wav")
        .tempfile()?;

    match toolchain.extract_audio(path, options.sample_rate, scratch.path()) {
        Ok(()) => {}
        Err(ScanError::ToolFailed { stderr, .. }) => {
            log::warn!("No usable audio in {}: {stderr}", path.display());
            return Ok(Vec::new());
        }
        Err(error) => return Err(error),
    }

    let (samples, sample_rate) = match read_wav_mono(scratch.path()) {
        Ok(audio) => audio,
        Err(error) => {
            log::warn!("Extracted audio of {} unreadable: {error}", path.display());
            return Ok(Vec::new());
        }
    };

    let window = (f64::from(sample_rate) * options.window_duration) as u64;
    let total = (window >= 2)
        .then(|| (samples.len() as u64).saturating_sub(window) / (window / 2).max(1) + 1);
    let mut tracker = scan_options.tracker(OperationType::ToneScan, total);
    let event = find_tone_with(&samples, sample_rate, options, |_| tracker.advance());
    tracker.finish();

    let events: Vec<DefectEvent> = event.into_iter().collect();
    log::info!("tone: {} segment(s) in {}", events.len(), path.display());
    Ok(events)
}
