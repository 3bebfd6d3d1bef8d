//! FFmpeg verbosity control.
//!
//! Two FFmpeg instances talk to the terminal during a scan: the libraries
//! linked in-process for frame decoding, and the `ffmpeg`/`ffprobe`
//! executables spawned for scene filters and audio extraction. The same
//! [`FfmpegLogLevel`] drives both: [`set_ffmpeg_log_level`] for the linked
//! libraries and [`FfmpegLogLevel::as_cli_arg`] for the `-loglevel` flag.
//!
//! Scene filters report their findings at `info` level, so the spawned
//! filter passes always run at [`FfmpegLogLevel::Info`] or more verbose
//! regardless of this setting.
//!
//! This does not touch the Rust-side `log` output of this crate.

use ffmpeg_next::util::log::Level;

/// FFmpeg log verbosity, most quiet first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FfmpegLogLevel {
    /// No output at all.
    Quiet,
    /// Unrecoverable errors that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors. This is the crate default.
    #[default]
    Error,
    /// Warnings.
    Warning,
    /// Informational messages, including filter findings.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    /// The value FFmpeg's command-line tools accept for `-loglevel`.
    pub fn as_cli_arg(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }

    /// Parse a level name as accepted by `-loglevel` (`warn` is also accepted).
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Some(FfmpegLogLevel::Quiet),
            "panic" => Some(FfmpegLogLevel::Panic),
            "fatal" => Some(FfmpegLogLevel::Fatal),
            "error" => Some(FfmpegLogLevel::Error),
            "warning" | "warn" => Some(FfmpegLogLevel::Warning),
            "info" => Some(FfmpegLogLevel::Info),
            "verbose" => Some(FfmpegLogLevel::Verbose),
            "debug" => Some(FfmpegLogLevel::Debug),
            "trace" => Some(FfmpegLogLevel::Trace),
            _ => None,
        }
    }

    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set the verbosity of the in-process FFmpeg libraries used for decoding.
///
/// # Example
///
/// ```no_run
/// use vidscan::FfmpegLogLevel;
///
/// vidscan::set_ffmpeg_log_level(FfmpegLogLevel::Quiet);
/// ```
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
