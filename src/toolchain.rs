//! External media tool boundary.
//!
//! Black and freeze detection, audio extraction, and the container duration
//! probe are delegated to FFmpeg's command-line tools. [`MediaToolchain`]
//! is the narrow interface the detectors see, so the concrete tool can be
//! swapped, and tests can feed canned diagnostic text without spawning
//! processes. [`FfmpegCli`] is the implementation backed by the `ffmpeg`
//! and `ffprobe` executables.
//!
//! A tool that cannot be started, or that exits unsuccessfully, is reported
//! as [`ScanError::ToolSpawn`] or [`ScanError::ToolFailed`]. It is never
//! confused with a successful run that found nothing.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::config::{BlackDetectOptions, FreezeDetectOptions};
use crate::error::ScanError;
use crate::ffmpeg::FfmpegLogLevel;

/// Lines of stderr kept in [`ScanError::ToolFailed`].
const STDERR_TAIL_LINES: usize = 6;

/// A scene-classification filter run over the whole video stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneFilter {
    /// FFmpeg's `blackdetect` filter.
    Black(BlackDetectOptions),
    /// FFmpeg's `freezedetect` filter.
    Freeze(FreezeDetectOptions),
}

impl SceneFilter {
    /// Filter name as known to FFmpeg.
    pub fn name(&self) -> &'static str {
        match self {
            SceneFilter::Black(_) => "blackdetect",
            SceneFilter::Freeze(_) => "freezedetect",
        }
    }

    /// The `-vf` argument for this filter and its parameters.
    ///
    /// ```
    /// use vidscan::{BlackDetectOptions, SceneFilter};
    ///
    /// let filter = SceneFilter::Black(BlackDetectOptions::default());
    /// assert_eq!(filter.filter_arg(), "blackdetect=d=10:pix_th=0.1:pic_th=0.98");
    /// ```
    pub fn filter_arg(&self) -> String {
        match self {
            SceneFilter::Black(options) => format!(
                "blackdetect=d={}:pix_th={}:pic_th={}",
                options.min_duration, options.pixel_threshold, options.picture_threshold
            ),
            SceneFilter::Freeze(options) => format!(
                "freezedetect=n={}:d={}",
                options.noise, options.min_duration
            ),
        }
    }
}

/// The external capabilities the detectors depend on.
///
/// Implementations must be usable from several threads at once; each call
/// is independent.
pub trait MediaToolchain: Send + Sync {
    /// Container duration in seconds as reported by the media probe.
    fn probe_duration(&self, path: &Path) -> Result<f64, ScanError>;

    /// Run `filter` over the video stream and return its diagnostic text.
    fn run_scene_filter(&self, path: &Path, filter: &SceneFilter) -> Result<String, ScanError>;

    /// Decode the audio track to mono PCM WAV at `sample_rate` into `destination`.
    fn extract_audio(
        &self,
        path: &Path,
        sample_rate: u32,
        destination: &Path,
    ) -> Result<(), ScanError>;
}

impl<T: MediaToolchain + ?Sized> MediaToolchain for &T {
    fn probe_duration(&self, path: &Path) -> Result<f64, ScanError> {
        (**self).probe_duration(path)
    }

    fn run_scene_filter(&self, path: &Path, filter: &SceneFilter) -> Result<String, ScanError> {
        (**self).run_scene_filter(path, filter)
    }

    fn extract_audio(
        &self,
        path: &Path,
        sample_rate: u32,
        destination: &Path,
    ) -> Result<(), ScanError> {
        (**self).extract_audio(path, sample_rate, destination)
    }
}

/// [`MediaToolchain`] backed by the `ffmpeg` and `ffprobe` executables.
///
/// By default both are looked up on `PATH`.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
///
/// use vidscan::{FfmpegCli, MediaToolchain};
///
/// let tools = FfmpegCli::new().with_ffmpeg("/opt/ffmpeg/bin/ffmpeg");
/// let seconds = tools.probe_duration(Path::new("tape_01.mp4"))?;
/// # Ok::<(), vidscan::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    log_level: FfmpegLogLevel,
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegCli {
    /// Use `ffmpeg` and `ffprobe` from `PATH`, logging errors only.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            log_level: FfmpegLogLevel::Error,
        }
    }

    /// Use a specific `ffmpeg` executable.
    #[must_use]
    pub fn with_ffmpeg(mut self, program: impl Into<PathBuf>) -> Self {
        self.ffmpeg = program.into();
        self
    }

    /// Use a specific `ffprobe` executable.
    #[must_use]
    pub fn with_ffprobe(mut self, program: impl Into<PathBuf>) -> Self {
        self.ffprobe = program.into();
        self
    }

    /// Set the `-loglevel` passed to the spawned tools.
    #[must_use]
    pub fn with_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.log_level = level;
        self
    }

    fn run(&self, program: &Path, command: &mut Command) -> Result<Output, ScanError> {
        let tool = program.display().to_string();
        log::debug!("Running {tool} {:?}", command.get_args().collect::<Vec<&OsStr>>());

        let output = command.output().map_err(|source| ScanError::ToolSpawn {
            tool: tool.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScanError::ToolFailed {
                tool,
                status: output.status.to_string(),
                stderr: stderr_tail(&stderr),
            });
        }
        Ok(output)
    }
}

impl MediaToolchain for FfmpegCli {
    fn probe_duration(&self, path: &Path) -> Result<f64, ScanError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "error"])
            .args(["-show_entries", "format=duration"])
            .args(["-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = self.run(&self.ffprobe, &mut command)?;
        let text = String::from_utf8_lossy(&output.stdout);
        let trimmed = text.trim();
        trimmed
            .parse::<f64>()
            .map_err(|_| ScanError::ProbeParse(trimmed.to_string()))
    }

    fn run_scene_filter(&self, path: &Path, filter: &SceneFilter) -> Result<String, ScanError> {
        // Filter findings are logged at info level.
        let level = self.log_level.max(FfmpegLogLevel::Info);
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-nostdin", "-loglevel", level.as_cli_arg()])
            .arg("-i")
            .arg(path)
            .args(["-vf", &filter.filter_arg()])
            .args(["-an", "-f", "null", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let output = self.run(&self.ffmpeg, &mut command)?;
        Ok(String::from_utf8_lossy(&output.stderr).into_owned())
    }

    fn extract_audio(
        &self,
        path: &Path,
        sample_rate: u32,
        destination: &Path,
    ) -> Result<(), ScanError> {
        let mut command = Command::new(&self.ffmpeg);
        command
            .args(["-hide_banner", "-nostdin", "-loglevel", self.log_level.as_cli_arg()])
            .arg("-y")
            .arg("-i")
            .arg(path)
            .args(["-vn", "-ac", "1"])
            .args(["-ar", &sample_rate.to_string()])
            .args(["-f", "wav"])
            .arg(destination)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        self.run(&self.ffmpeg, &mut command)?;
        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join(" | ")
}
