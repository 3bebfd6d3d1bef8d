//! Parallel batch analysis.
//!
//! Each video is analysed on its own rayon worker. Decoders are opened per
//! call and every tone search writes its own scratch file, so workers share
//! nothing but the read-only analyzer.
//!
//! The public API is exposed through
//! [`Analyzer::analyze_batch_parallel`](crate::Analyzer::analyze_batch_parallel).

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use ::rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::analyzer::Analyzer;
use crate::config::ScanOptions;
use crate::progress::OperationType;
use crate::report::VideoAnalysisResult;
use crate::toolchain::MediaToolchain;

/// Analyse `paths` in parallel, returning results in input order.
pub(crate) fn analyze_parallel<T: MediaToolchain>(
    analyzer: &Analyzer<T>,
    paths: &[PathBuf],
    options: &ScanOptions,
) -> Vec<VideoAnalysisResult> {
    let tracker = Mutex::new(options.tracker(OperationType::BatchAnalysis, Some(paths.len() as u64)));

    let results = paths
        .par_iter()
        .map(|path| {
            let result = analyzer.analyze(path);
            tracker
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .advance();
            result
        })
        .collect();

    tracker
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .finish();
    results
}
