//! # vidscan
//!
//! Scan archived video files for technical defects and measure how much of
//! each timeline is damaged.
//!
//! Five independent detectors look for:
//!
//! - **black** stretches, via FFmpeg's `blackdetect` filter,
//! - **frozen** pictures, via FFmpeg's `freezedetect` filter,
//! - **color glitches** (green-dominant, pink-cast or oversaturated frames),
//!   by decoding every frame through [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next),
//! - the **1 kHz calibration tone** on the audio track, by spectral analysis,
//! - **gray noise and stripes**, by sampling about one frame per second.
//!
//! Detectors may report overlapping ranges. The damage percentage is based
//! on the union of all ranges, so overlapping seconds are counted once.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vidscan::{Analyzer, FfmpegCli};
//!
//! let analyzer = Analyzer::new(FfmpegCli::new());
//! let result = analyzer.analyze("tape_01.mp4");
//!
//! for row in result.event_rows() {
//!     println!("{} {} → {} ({:.2} sec)", row.kind, row.start_time, row.end_time, row.duration_sec);
//! }
//! println!("{}", result.summary_line());
//! ```
//!
//! ### A Whole Directory
//!
//! ```no_run
//! use std::path::Path;
//!
//! use vidscan::{Analyzer, FfmpegCli, collect_videos};
//!
//! let videos = collect_videos(Path::new("archive/"))?;
//! let analyzer = Analyzer::new(FfmpegCli::new());
//! for result in analyzer.analyze_batch(&videos) {
//!     println!("{}: {:.2}%", result.video_id(), result.damage_percent());
//! }
//! # Ok::<(), vidscan::ScanError>(())
//! ```
//!
//! ### Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `rayon` | `Analyzer::analyze_batch_parallel` analyses videos on rayon threads |
//! | `full` | Enables all of the above |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build, and the
//! `ffmpeg` and `ffprobe` executables must be available at run time.

pub mod analyzer;
pub mod batch;
pub mod black;
pub mod config;
mod conversion;
pub mod error;
pub mod event;
pub mod ffmpeg;
pub mod freeze;
pub mod glitch;
pub mod media;
pub mod progress;
#[cfg(feature = "rayon")]
mod rayon;
pub mod report;
pub mod span;
pub mod stripe;
pub mod timeline;
pub mod tone;
pub mod toolchain;

pub use analyzer::Analyzer;
pub use batch::{VIDEO_EXTENSIONS, collect_videos, is_video_file, natural_cmp, sort_naturally};
pub use black::{detect_black, parse_black_events};
pub use config::{
    BlackDetectOptions, DetectorConfig, FreezeDetectOptions, GlitchOptions, ScanOptions,
    StripeOptions, ToneOptions,
};
pub use error::ScanError;
pub use event::{DefectEvent, DefectKind};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use freeze::{detect_freezes, parse_freeze_events};
pub use glitch::{ColorMeans, detect_glitches, is_glitch_frame, scan_glitches};
pub use media::{FrameStream, VideoMetadata, VideoSource, probe_duration};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use report::{
    DetectorIssue, EventRow, SummaryRow, VideoAnalysisResult, format_hms, format_mmss,
    parse_timecode,
};
pub use span::{Span, SpanTracker, sustained_spans};
pub use stripe::{StripeScore, detect_stripes, scan_stripes};
pub use timeline::{Coverage, TimeInterval, damage_percent, merge_intervals, union_length};
pub use tone::{detect_tone, dominant_frequency, find_tone, read_wav_mono};
pub use toolchain::{FfmpegCli, MediaToolchain, SceneFilter};
