//! Echoview annotation toolkit
//!
//! A Rust library for reading the annotation files exported by Echoview
//! and turning region polygons into masks.
//!
//! This library provides tools for:
//! - Parsing line (.evl) and 2D region (.evr) files into structured records
//! - Decoding and encoding Echoview `D{date}T{time}` timestamps
//! - Replacing sentinel depths with caller-supplied values
//! - Selecting regions and sonar files, and exporting to CSV or JSON
//! - Rasterizing regions and converting between label rasters and one-hot stacks
//! - Parsing many files concurrently with per-file error reporting

pub mod batch;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod mask;
pub mod models;
pub mod parser;
pub mod query;
pub mod rasterize;
pub mod reader;
pub mod time;

// Re-export commonly used types
pub use batch::{BatchOutcome, parse_batch};
pub use config::ProcessingConfig;
pub use error::{EchoregionsError, Result};
pub use export::ExportFormat;
pub use mask::{LabelRaster, OneHotMaskStack, from_one_hot, to_one_hot};
pub use models::{
    Depth, FileMetadata, LineFile, PointStatus, RangeSentinel, Region, RegionFile,
    RegionMetadata, RegionPoint, RegionType, TimePoint,
};
pub use parser::{DepthBounds, LineFileParser, RangeProfileSource, RegionFileParser};
pub use query::{PointSource, RegionFilter, lookup_points, select_regions, select_sonar_files};
pub use rasterize::{MaskGrid, rasterize_regions};
