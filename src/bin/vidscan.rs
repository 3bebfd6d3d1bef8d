use std::{path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use vidscan::{
    Analyzer, DetectorConfig, FfmpegCli, FfmpegLogLevel, GlitchOptions, OperationType,
    ProgressCallback, ProgressInfo, ScanOptions, VideoAnalysisResult, collect_videos, format_hms,
    format_mmss, is_video_file, probe_duration, sort_naturally,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidscan analyze tape_01.mp4\n  vidscan analyze archive/ --progress --verbose\n  vidscan analyze tape_01.mp4 tape_02.mp4 --json > report.json\n  vidscan duration tape_01.mp4\n  vidscan completions zsh > _vidscan";

#[derive(Debug, Parser)]
#[command(
    name = "vidscan",
    version,
    about = "Scan archived videos for black, frozen, glitched, tone and noise defects",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show each defect as it is reported.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar during frame and audio scans.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse videos and print their defects.
    #[command(
        about = "Analyse videos for defects",
        visible_alias = "scan",
        after_help = "Directories are expanded to the videos they contain (.mp4 .mov .mkv .avi .m4v).\nVideos are processed in natural order: tape2 before tape10."
    )]
    Analyze {
        /// Video files or directories.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print results as machine-readable JSON.
        #[arg(long)]
        json: bool,

        /// Fraction of the frame height ignored by the glitch detector (0.0-1.0).
        #[arg(long, value_parser = parse_ratio, default_value_t = 0.0)]
        crop_top: f64,

        /// Minimum color-anomaly length in seconds.
        #[arg(long, default_value_t = 10.0)]
        min_glitch: f64,

        /// Calibration tone frequency in hertz.
        #[arg(long, default_value_t = 1000.0)]
        tone_hz: f64,
    },

    /// Print the running time of a video.
    #[command(about = "Print video duration")]
    Duration {
        /// Video file.
        input: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(format!("must be between 0.0 and 1.0, got {ratio}"))
    }
}

fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut videos = Vec::new();
    for input in inputs {
        if input.is_dir() {
            videos.extend(collect_videos(input)?);
        } else if input.is_file() {
            if !is_video_file(input) {
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("{} has no known video extension", input.display()).yellow()
                );
            }
            videos.push(input.clone());
        } else {
            return Err(format!("input not found: {}", input.display()).into());
        }
    }
    sort_naturally(&mut videos);
    videos.dedup();
    Ok(videos)
}

fn operation_label(operation: OperationType) -> &'static str {
    match operation {
        OperationType::GlitchScan => "glitch",
        OperationType::StripeScan => "stripes",
        OperationType::ToneScan => "tone",
        OperationType::BatchAnalysis => "batch",
        _ => "scan",
    }
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {msg:>8} {bar:40.cyan/blue} {pos}/{len}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        // Batch progress is reported per video by the command itself.
        if info.operation == OperationType::BatchAnalysis {
            return;
        }
        self.bar.set_message(operation_label(info.operation));
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
    }
}

fn apply_log_level(global: &GlobalOptions) -> Result<FfmpegLogLevel, Box<dyn std::error::Error>> {
    let level = match &global.log_level {
        Some(level) => {
            FfmpegLogLevel::parse(level).ok_or(format!("unsupported --log-level: {level}"))?
        }
        None => FfmpegLogLevel::default(),
    };
    vidscan::set_ffmpeg_log_level(level);
    Ok(level)
}

fn print_result(result: &VideoAnalysisResult, verbose: bool) {
    let rows = result.event_rows();
    if rows.is_empty() {
        println!("   {}", "no defects found".green());
    } else if verbose {
        for row in &rows {
            println!(
                "   {} {} → {} ({:.2} sec) {}",
                row.kind.to_string().red().bold(),
                row.start_time,
                row.end_time,
                row.duration_sec,
                row.details.dimmed()
            );
        }
    }

    for issue in result.issues() {
        eprintln!(
            "   {} {}",
            format!("{} skipped:", issue.detector).yellow().bold(),
            issue.message.yellow()
        );
    }

    let summary = result.summary_line();
    if result.damage_percent() > 0.0 {
        println!("   {}", summary.red().bold());
    } else {
        println!("   {}", summary.green());
    }
}

fn result_json(result: &VideoAnalysisResult) -> serde_json::Value {
    json!({
        "video_file": result.video_id(),
        "duration_sec": result.duration_sec(),
        "events": result.event_rows(),
        "total_raw_defect_sec": result.total_raw_defect_sec(),
        "covered_sec": result.covered_sec(),
        "damage_percent": result.damage_percent(),
        "merged": result.merged_intervals(),
        "issues": result.issues(),
        "summary": result.summary_row(),
    })
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_level = apply_log_level(&cli.global)?;
    let toolchain = FfmpegCli::new().with_log_level(log_level);

    match cli.command {
        Commands::Analyze {
            inputs,
            json,
            crop_top,
            min_glitch,
            tone_hz,
        } => {
            let videos = expand_inputs(&inputs)?;
            if videos.is_empty() {
                return Err("no videos to analyse".into());
            }

            let mut config = DetectorConfig::new().with_glitch(
                GlitchOptions::new()
                    .crop_top_ratio(crop_top)
                    .min_duration(min_glitch),
            );
            config.tone.frequency = tone_hz;

            let mut options = ScanOptions::new();
            if cli.global.progress && !json {
                options = options
                    .with_progress(Arc::new(TerminalProgress::new()?))
                    .with_batch_size(25);
            }
            let analyzer = Analyzer::new(toolchain).with_config(config).with_options(options);

            let mut results = Vec::with_capacity(videos.len());
            for video in &videos {
                if !json {
                    println!("{} {}", "▶".cyan().bold(), video.display());
                }
                let result = analyzer.analyze(video);
                if !json {
                    print_result(&result, cli.global.verbose);
                }
                results.push(result);
            }

            if json {
                let payload: Vec<serde_json::Value> = results.iter().map(result_json).collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if results.len() > 1 {
                let damaged = results.iter().filter(|r| !r.events().is_empty()).count();
                println!(
                    "{} {} video(s) analysed, {damaged} with defects",
                    "done:".green().bold(),
                    results.len()
                );
            }
        }
        Commands::Duration { input } => {
            let seconds = probe_duration(&toolchain, &input);
            if seconds <= 0.0 {
                return Err(format!("duration of {} is unknown", input.display()).into());
            }
            println!(
                "{seconds:.2} sec ({} / {})",
                format_hms(seconds),
                format_mmss(seconds)
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "vidscan", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{expand_inputs, parse_ratio};

    #[test]
    fn parse_ratio_bounds() {
        assert_eq!(parse_ratio("0.1").unwrap(), 0.1);
        assert_eq!(parse_ratio(" 1 ").unwrap(), 1.0);
        assert!(parse_ratio("1.5").is_err());
        assert!(parse_ratio("-0.1").is_err());
        assert!(parse_ratio("top").is_err());
    }

    #[test]
    fn expand_inputs_orders_naturally() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["tape10.mp4", "tape2.MKV", "notes.txt", "tape1.avi"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }

        let videos = expand_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = videos
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["tape1.avi", "tape2.MKV", "tape10.mp4"]);
    }

    #[test]
    fn expand_inputs_rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(expand_inputs(&[dir.path().join("missing.mp4")]).is_err());
    }
}
