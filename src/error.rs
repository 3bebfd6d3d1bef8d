//! Error types for the `vidscan` crate.
//!
//! This module defines [`ScanError`], the unified error type returned by all
//! fallible operations in the crate. Errors carry the file path, tool name,
//! or frame index involved so a failed detector can be reported without
//! additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `vidscan` operations.
///
/// Detector failures never abort a whole analysis: the
/// [`Analyzer`](crate::Analyzer) records them as
/// [`DetectorIssue`](crate::DetectorIssue)s on the result instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScanError {
    /// The media file could not be opened for decoding.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The video stream reports no usable frame rate.
    #[error("Video stream has no usable frame rate")]
    UnknownFrameRate,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// The requested frame index lies past the end of the stream.
    #[error("Frame {frame_index} is out of range (video has {frame_count} frames)")]
    FrameOutOfRange {
        /// The frame index that was requested.
        frame_index: u64,
        /// The number of frames in the video.
        frame_count: u64,
    },

    /// An external tool (ffmpeg, ffprobe) could not be started at all.
    #[error("Failed to run {tool}: {source}")]
    ToolSpawn {
        /// Program name or path that was executed.
        tool: String,
        /// Error returned by the operating system.
        #[source]
        source: IoError,
    },

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        /// Program name or path that was executed.
        tool: String,
        /// Exit status description (code or signal).
        status: String,
        /// Last lines of the tool's diagnostic output.
        stderr: String,
    },

    /// The container duration reported by the probe could not be parsed.
    #[error("Could not parse probe output {0:?} as a duration")]
    ProbeParse(String),

    /// Extracted audio could not be read back.
    #[error("WAV read error: {0}")]
    WavError(#[from] hound::Error),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for ScanError {
    fn from(error: FfmpegError) -> Self {
        ScanError::FfmpegError(error.to_string())
    }
}
