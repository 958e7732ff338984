//! Concurrent parsing of many annotation files.
//!
//! Each file is parsed by one blocking task, so a reader never crosses
//! threads. A failed file is logged and reported; it never stops the batch.

use crate::error::{EchoregionsError, Result};
use crate::models::{LineFile, RegionFile};
use crate::parser::{LineFileParser, RegionFileParser};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{debug, error};

/// Results of a batch, each list in input order
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub parsed: Vec<(PathBuf, T)>,
    pub failed: Vec<(PathBuf, EchoregionsError)>,
}

impl<T> BatchOutcome<T> {
    pub fn parsed_count(&self) -> usize {
        self.parsed.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.parsed.len() + self.failed.len()
    }
}

/// Parse `paths` with at most `concurrency` files in flight
pub async fn parse_batch<T, F>(
    paths: &[PathBuf],
    concurrency: usize,
    progress: &ProgressBar,
    parse_fn: F,
) -> BatchOutcome<T>
where
    T: Send + 'static,
    F: Fn(&Path) -> Result<T> + Send + Sync + 'static,
{
    let parse_fn = Arc::new(parse_fn);
    let limit = concurrency.max(1);
    debug!("Parsing {} files with {} workers", paths.len(), limit);

    let mut results: Vec<(usize, PathBuf, Result<T>)> = stream::iter(paths.iter().cloned().enumerate())
        .map(|(position, path)| {
            let parse_fn = Arc::clone(&parse_fn);
            let pb = progress.clone();
            async move {
                if let Some(file_name) = path.file_name() {
                    pb.set_message(format!("Parsing: {}", file_name.to_string_lossy()));
                }

                let result = task::spawn_blocking({
                    let path = path.clone();
                    move || parse_fn(&path)
                })
                .await
                .map_err(|e| EchoregionsError::Io(std::io::Error::other(e)))
                .and_then(|parsed| parsed);
                pb.inc(1);

                match &result {
                    Ok(_) => debug!("Parsed: {}", path.display()),
                    Err(e) => error!("Failed to parse {}: {}", path.display(), e),
                }
                (position, path, result)
            }
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    results.sort_by_key(|(position, _, _)| *position);

    let mut outcome = BatchOutcome {
        parsed: Vec::new(),
        failed: Vec::new(),
    };
    for (_, path, result) in results {
        match result {
            Ok(value) => outcome.parsed.push((path, value)),
            Err(e) => outcome.failed.push((path, e)),
        }
    }
    outcome
}

pub async fn parse_line_files(
    paths: &[PathBuf],
    parser: &LineFileParser,
    concurrency: usize,
    progress: &ProgressBar,
) -> BatchOutcome<LineFile> {
    let parser = parser.clone();
    parse_batch(paths, concurrency, progress, move |path| parser.parse_file(path)).await
}

pub async fn parse_region_files(
    paths: &[PathBuf],
    parser: &RegionFileParser,
    convert_range_edges: bool,
    concurrency: usize,
    progress: &ProgressBar,
) -> BatchOutcome<RegionFile> {
    let parser = parser.clone();
    parse_batch(paths, concurrency, progress, move |path| {
        parser.parse_file(path, convert_range_edges)
    })
    .await
}
