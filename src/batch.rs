//! Video discovery and natural ordering.
//!
//! Batches are processed in natural order: digit runs compare as numbers,
//! so `tape2.mp4` comes before `tape10.mp4`. Everything else compares
//! case-insensitively.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScanError;

/// File extensions treated as video, lower case without the dot.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "mkv", "avi", "m4v"];

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Number(&'a str),
    Text(String),
}

fn tokens(name: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = name;
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let split = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (run, tail) = rest.split_at(split);
        tokens.push(if is_digit {
            Token::Number(run)
        } else {
            Token::Text(run.to_lowercase())
        });
        rest = tail;
    }
    tokens
}

/// Compare digit strings by numeric value without parsing.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn compare_tokens(a: &Token<'_>, b: &Token<'_>) -> Ordering {
    match (a, b) {
        (Token::Number(a), Token::Number(b)) => compare_digits(a, b),
        (Token::Text(a), Token::Text(b)) => a.cmp(b),
        (Token::Number(_), Token::Text(_)) => Ordering::Less,
        (Token::Text(_), Token::Number(_)) => Ordering::Greater,
    }
}

/// Natural-order comparison of two names.
///
/// Names that differ only in case or leading zeros fall back to a plain
/// byte comparison, so the order is total.
///
/// ```
/// use std::cmp::Ordering;
///
/// use vidscan::natural_cmp;
///
/// assert_eq!(natural_cmp("file2.mp4", "file10.mp4"), Ordering::Less);
/// assert_eq!(natural_cmp("Tape_3", "tape_03b"), Ordering::Less);
/// ```
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = tokens(a);
    let right = tokens(b);
    left.iter()
        .zip(&right)
        .map(|(x, y)| compare_tokens(x, y))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| left.len().cmp(&right.len()))
        .then_with(|| a.cmp(b))
}

/// Sort paths naturally by file name.
pub fn sort_naturally(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_cmp(&file_name(a), &file_name(b)));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Returns `true` if `path` has one of the [`VIDEO_EXTENSIONS`], ignoring case.
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| extension.eq_ignore_ascii_case(known))
        })
}

/// List the video files directly inside `dir`, naturally sorted.
///
/// Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`ScanError::IoError`] if the directory cannot be read.
pub fn collect_videos(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut videos = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_video_file(&path) {
            videos.push(path);
        }
    }
    sort_naturally(&mut videos);
    log::debug!("Found {} video(s) in {}", videos.len(), dir.display());
    Ok(videos)
}
