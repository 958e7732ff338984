//! Command-line argument definitions
//!
//! The CLI converts Echoview annotation files to CSV or JSON and prints the
//! points of single regions.

use crate::config::ProcessingConfig;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Parse Echoview line (.evl) and region (.evr) annotation files
#[derive(Debug, Clone, Parser)]
#[command(
    name = "echoregions",
    version,
    about = "Parse Echoview line and region annotation files",
    long_about = "Parses Echoview line (.evl) and 2D region (.evr) annotation exports \
                  and writes them as CSV or JSON, optionally replacing sentinel depths \
                  with usable values."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Convert annotation files to CSV or JSON
    Convert(ConvertArgs),
    /// Print the points of one region
    Points(PointsArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Files, directories (searched for .evl/.evr) or glob patterns
    #[arg(value_name = "INPUTS", required = true)]
    pub inputs: Vec<String>,

    /// Output directory; defaults to the directory of each input file
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Replace the line-file invalid-range depth (-10000.990000) with VALUE
    #[arg(long = "replace-nan-range", value_name = "VALUE", allow_hyphen_values = true)]
    pub replace_nan_range: Option<f64>,

    /// Replace region range-edge depths with --min-depth / --max-depth
    #[arg(long = "convert-range-edges")]
    pub convert_range_edges: bool,

    #[arg(long = "min-depth", value_name = "METRES", allow_hyphen_values = true)]
    pub min_depth: Option<f64>,

    #[arg(long = "max-depth", value_name = "METRES", allow_hyphen_values = true)]
    pub max_depth: Option<f64>,

    /// Number of files parsed concurrently (default: CPU count)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Parser)]
pub struct PointsArgs {
    /// Region CSV or JSON export, or an .evr file
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    #[arg(value_name = "REGION_ID")]
    pub region_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

impl Args {
    /// Tracing filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "echoregions=debug"
        } else {
            crate::constants::DEFAULT_LOG_FILTER
        }
    }
}

impl ConvertArgs {
    pub fn to_config(&self) -> ProcessingConfig {
        let mut config = ProcessingConfig::default().with_export_format(self.format.into());
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(value) = self.replace_nan_range {
            config = config.with_replacement(value);
        }
        if self.convert_range_edges {
            config = config.with_range_edges(self.min_depth, self.max_depth);
        } else {
            config.min_depth = self.min_depth;
            config.max_depth = self.max_depth;
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        config
    }
}
