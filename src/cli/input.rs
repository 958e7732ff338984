//! Input path expansion
//!
//! Turns command-line inputs (files, directories and glob patterns) into a
//! sorted list of annotation files.

use crate::constants::{LINE_FILE_EXTENSION, REGION_FILE_EXTENSION};
use crate::error::{EchoregionsError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Annotation format, from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Line,
    Region,
}

impl AnnotationKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
        match ext.as_str() {
            LINE_FILE_EXTENSION => Some(AnnotationKind::Line),
            REGION_FILE_EXTENSION => Some(AnnotationKind::Region),
            _ => None,
        }
    }
}

/// Expand inputs into annotation files, sorted and without duplicates.
///
/// Directories are searched recursively; directory and glob matches are
/// kept only when they carry an annotation extension.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.insert(path.to_path_buf());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && AnnotationKind::from_path(entry_path).is_some() {
                    files.insert(entry_path.to_path_buf());
                }
            }
        } else if is_glob_pattern(input) {
            let matches = glob::glob(input).map_err(|e| {
                EchoregionsError::invalid_value(format!("invalid glob pattern '{}': {}", input, e))
            })?;
            let mut matched = 0usize;
            for entry in matches.filter_map(|e| e.ok()) {
                if entry.is_file() && AnnotationKind::from_path(&entry).is_some() {
                    files.insert(entry);
                    matched += 1;
                }
            }
            debug!("Pattern {} matched {} files", input, matched);
        } else {
            return Err(EchoregionsError::invalid_value(format!(
                "input does not exist: {}",
                input
            )));
        }
    }

    Ok(files.into_iter().collect())
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}
