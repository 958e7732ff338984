//! Processing configuration.
//!
//! Collects the parser options, batch concurrency and export settings used
//! by the command-line front end, and builds configured parsers from them.

use crate::error::{EchoregionsError, Result};
use crate::export::ExportFormat;
use crate::parser::{DepthBounds, LineFileParser, RegionFileParser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global configuration for annotation processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Number of files parsed concurrently
    pub workers: usize,

    /// Replacement for the line-file invalid-range sentinel
    pub replace_nan_range_value: Option<f64>,

    /// Replace region range-edge sentinels with the depth bounds
    pub convert_range_edges: bool,

    pub min_depth: Option<f64>,
    pub max_depth: Option<f64>,

    pub export_format: ExportFormat,

    /// Output directory; defaults to each input file's directory
    pub output_dir: Option<PathBuf>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            replace_nan_range_value: None,
            convert_range_edges: false,
            min_depth: None,
            max_depth: None,
            export_format: ExportFormat::Csv,
            output_dir: None,
        }
    }
}

impl ProcessingConfig {
    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_replacement(mut self, value: f64) -> Self {
        self.replace_nan_range_value = Some(value);
        self
    }

    /// Enable range-edge conversion with the given bounds
    pub fn with_range_edges(mut self, min_depth: Option<f64>, max_depth: Option<f64>) -> Self {
        self.convert_range_edges = true;
        self.min_depth = min_depth;
        self.max_depth = max_depth;
        self
    }

    pub fn with_export_format(mut self, format: ExportFormat) -> Self {
        self.export_format = format;
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(EchoregionsError::invalid_value("workers must be at least 1"));
        }
        if let Some(value) = self.replace_nan_range_value.filter(|v| !v.is_finite()) {
            return Err(EchoregionsError::invalid_value(format!(
                "replacement depth {} is not finite",
                value
            )));
        }
        self.depth_bounds()?;
        Ok(())
    }

    pub fn depth_bounds(&self) -> Result<DepthBounds> {
        DepthBounds::new(self.min_depth, self.max_depth)
    }

    pub fn line_parser(&self) -> LineFileParser {
        match self.replace_nan_range_value {
            Some(value) => LineFileParser::new().with_replacement(value),
            None => LineFileParser::new(),
        }
    }

    pub fn region_parser(&self) -> Result<RegionFileParser> {
        Ok(RegionFileParser::with_bounds(self.depth_bounds()?))
    }
}
