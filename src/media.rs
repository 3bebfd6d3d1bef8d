//! Video source adapter.
//!
//! [`VideoSource`] opens a file with the linked FFmpeg libraries and offers
//! the two access patterns the frame-based detectors need: a sequential
//! [`FrameStream`] over every frame, and random-access
//! [`sample_frame`](VideoSource::sample_frame). Frames are delivered as
//! [`image::RgbImage`] so classifiers can be tested on synthetic pictures.
//!
//! [`probe_duration`] determines the running time of a file and never fails.
//!
//! # Example
//!
//! ```no_run
//! use vidscan::VideoSource;
//!
//! let mut source = VideoSource::open("tape_03.avi")?;
//! println!("{} frames @ {:.2} fps", source.frame_count(), source.frames_per_second());
//! for frame in source.frames()?.take(10) {
//!     let frame = frame?;
//!     println!("{}x{}", frame.width(), frame.height());
//! }
//! # Ok::<(), vidscan::ScanError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::RgbImage;

use crate::conversion::{
    frame_index_to_seek_timestamp, pts_to_frame_index, pts_to_seconds, rgb_frame_to_buffer,
};
use crate::error::ScanError;
use crate::toolchain::MediaToolchain;

/// Properties of the video stream, read once at open time.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frame rate; may be approximate for variable-rate content.
    pub frames_per_second: f64,
    /// Frame count from the container, or estimated from duration × rate.
    pub frame_count: u64,
    /// Container duration in seconds, 0.0 when unknown.
    pub duration_sec: f64,
}

/// An opened video file.
pub struct VideoSource {
    input_context: Input,
    stream_index: usize,
    time_base: Rational,
    start_pts: i64,
    metadata: VideoMetadata,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open `path` and locate its best video stream.
    ///
    /// # Errors
    ///
    /// - [`ScanError::FileOpen`] if FFmpeg cannot open the file.
    /// - [`ScanError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video source: {}", path.display());

        ffmpeg_next::init().map_err(|error| ScanError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| ScanError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ScanError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let start_pts = match stream.start_time() {
            i64::MIN => 0,
            pts => pts,
        };

        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let rate = stream.avg_frame_rate();
        let frames_per_second = rational_to_f64(rate)
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(0.0);

        let duration_micros = input_context.duration();
        let duration_sec = if duration_micros > 0 {
            duration_micros as f64 / 1_000_000.0
        } else if stream.duration() > 0 {
            pts_to_seconds(stream.duration(), time_base)
        } else {
            0.0
        };

        let frame_count = match stream.frames() {
            count if count > 0 => count as u64,
            _ if frames_per_second > 0.0 => (duration_sec * frames_per_second).round() as u64,
            _ => 0,
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            duration_sec,
        };
        log::debug!("Video stream {stream_index}: {metadata:?}");

        Ok(Self {
            input_context,
            stream_index,
            time_base,
            start_pts,
            metadata,
            path,
        })
    }

    /// Stream properties.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Average frame rate.
    pub fn frames_per_second(&self) -> f64 {
        self.metadata.frames_per_second
    }

    /// Number of frames in the stream.
    pub fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    /// Path the source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Iterate over every frame from the start of the stream.
    pub fn frames(&mut self) -> Result<FrameStream<'_>, ScanError> {
        let decoder = self.fresh_decoder()?;
        // Rewinding a freshly opened file is a no-op; ignore failure on
        // non-seekable inputs.
        let _ = self.input_context.seek(0, ..0);

        Ok(FrameStream {
            source: self,
            decoder,
            converter: RgbConverter::default(),
            decoded_frame: VideoFrame::empty(),
            eof_sent: false,
            done: false,
        })
    }

    /// Decode the frame at `frame_index` (0-based).
    ///
    /// Seeks to the nearest keyframe before the target and decodes forward.
    /// When the exact index is missing (variable frame rate, dropped frames)
    /// the first frame after it is returned.
    ///
    /// # Errors
    ///
    /// - [`ScanError::FrameOutOfRange`] if the index is past the last frame.
    /// - [`ScanError::VideoDecodeError`] if no frame at or after the index
    ///   could be decoded.
    pub fn sample_frame(&mut self, frame_index: u64) -> Result<RgbImage, ScanError> {
        let frame_count = self.metadata.frame_count;
        if frame_count > 0 && frame_index >= frame_count {
            return Err(ScanError::FrameOutOfRange {
                frame_index,
                frame_count,
            });
        }
        let fps = self.metadata.frames_per_second;
        if fps <= 0.0 {
            return Err(ScanError::UnknownFrameRate);
        }

        let mut decoder = self.fresh_decoder()?;
        let start_offset = (pts_to_seconds(self.start_pts, self.time_base) * 1_000_000.0) as i64;
        let target = frame_index_to_seek_timestamp(frame_index, fps) + start_offset;
        self.input_context.seek(target, ..target)?;

        let mut converter = RgbConverter::default();
        let mut decoded_frame = VideoFrame::empty();
        let stream_index = self.stream_index;
        let (time_base, start_pts) = (self.time_base, self.start_pts);
        let reached = |frame: &VideoFrame| {
            frame.pts().map_or(true, |pts| {
                pts_to_frame_index(pts, start_pts, time_base, fps) >= frame_index
            })
        };

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if reached(&decoded_frame) {
                    return converter.convert(&decoded_frame);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            if reached(&decoded_frame) {
                return converter.convert(&decoded_frame);
            }
        }

        Err(ScanError::VideoDecodeError(format!(
            "Could not locate frame {frame_index} in {}",
            self.path.display()
        )))
    }

    fn fresh_decoder(&self) -> Result<VideoDecoder, ScanError> {
        let stream = self
            .input_context
            .stream(self.stream_index)
            .ok_or(ScanError::NoVideoStream)?;
        Ok(CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?)
    }
}

/// Sequential, pull-based iterator over decoded frames.
///
/// Created by [`VideoSource::frames`]. Yields an error at most once and
/// then stops; callers treat the error as the end of the stream.
pub struct FrameStream<'a> {
    source: &'a mut VideoSource,
    decoder: VideoDecoder,
    converter: RgbConverter,
    decoded_frame: VideoFrame,
    eof_sent: bool,
    done: bool,
}

impl FrameStream<'_> {
    /// Frame rate of the underlying stream.
    pub fn frames_per_second(&self) -> f64 {
        self.source.metadata.frames_per_second
    }

    /// Frame count of the underlying stream.
    pub fn frame_count(&self) -> u64 {
        self.source.metadata.frame_count
    }

    /// Frame dimensions as `(width, height)` reported by the decoder.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.source.metadata.width, self.source.metadata.height)
    }

    fn fail(&mut self, error: ScanError) -> Option<Result<RgbImage, ScanError>> {
        self.done = true;
        Some(Err(error))
    }
}

impl Iterator for FrameStream<'_> {
    type Item = Result<RgbImage, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return match self.converter.convert(&self.decoded_frame) {
                    Ok(image) => Some(Ok(image)),
                    Err(error) => self.fail(error),
                };
            }

            if self.eof_sent {
                self.done = true;
                return None;
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.source.input_context) {
                Ok(()) => {
                    if packet.stream() == self.source.stream_index
                        && let Err(error) = self.decoder.send_packet(&packet)
                    {
                        return self.fail(ScanError::VideoDecodeError(error.to_string()));
                    }
                }
                Err(FfmpegError::Eof) => {
                    if let Err(error) = self.decoder.send_eof() {
                        return self.fail(ScanError::from(error));
                    }
                    self.eof_sent = true;
                }
                Err(error) => {
                    return self.fail(ScanError::VideoDecodeError(error.to_string()));
                }
            }
        }
    }
}

/// Converts decoded frames of any pixel format to RGB24 images.
///
/// The scaler is built from the first frame actually decoded, since the
/// decoder's advertised format may differ from its real output, and is
/// rebuilt if the frame geometry changes mid-stream.
#[derive(Default)]
struct RgbConverter {
    scaler: Option<(ScalingContext, (Pixel, u32, u32))>,
    rgb_frame: Option<VideoFrame>,
}

impl RgbConverter {
    fn convert(&mut self, frame: &VideoFrame) -> Result<RgbImage, ScanError> {
        let key = (frame.format(), frame.width(), frame.height());
        let (width, height) = (key.1, key.2);

        if self.scaler.as_ref().is_none_or(|(_, current)| *current != key) {
            let context = ScalingContext::get(
                key.0,
                width,
                height,
                Pixel::RGB24,
                width,
                height,
                ScalingFlags::BILINEAR,
            )?;
            self.scaler = Some((context, key));
        }

        let rgb_frame = self.rgb_frame.get_or_insert_with(VideoFrame::empty);
        if let Some((scaler, _)) = self.scaler.as_mut() {
            scaler.run(frame, rgb_frame)?;
        }

        let buffer = rgb_frame_to_buffer(rgb_frame, width, height);
        RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ScanError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

fn rational_to_f64(rate: Rational) -> Option<f64> {
    (rate.numerator() > 0 && rate.denominator() > 0)
        .then(|| rate.numerator() as f64 / rate.denominator() as f64)
}

/// Running time of `path` in seconds.
///
/// Asks the toolchain's container probe first. If that fails or reports a
/// non-positive value, falls back to frame count ÷ frame rate from the
/// decoder. Returns 0.0 when neither works; callers treat 0.0 as unknown.
pub fn probe_duration<T: MediaToolchain + ?Sized>(toolchain: &T, path: &Path) -> f64 {
    match toolchain.probe_duration(path) {
        Ok(seconds) if seconds > 0.0 && seconds.is_finite() => return seconds,
        Ok(seconds) => log::debug!(
            "Probe reported duration {seconds} for {}; trying decoder",
            path.display()
        ),
        Err(error) => log::debug!("Probe failed for {}: {error}; trying decoder", path.display()),
    }

    match VideoSource::open(path) {
        Ok(source) => {
            let metadata = source.metadata();
            if metadata.frames_per_second > 0.0 && metadata.frame_count > 0 {
                return metadata.frame_count as f64 / metadata.frames_per_second;
            }
            log::warn!("Duration of {} is unknown", path.display());
        }
        Err(error) => log::warn!("Duration of {} is unknown: {error}", path.display()),
    }
    0.0
}
