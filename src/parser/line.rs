//! Echoview line (.evl) parser.
//!
//! A line file is a header record, a point count, then one record per point
//! holding a date, a time, a depth and a status code.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

use crate::constants::LINE_POINT_TOKEN_COUNT;
use crate::error::Result;
use crate::models::{Depth, LineFile, PointStatus, RangeSentinel, TimePoint};
use crate::reader::RecordReader;
use crate::time;

/// Parser for line files.
///
/// When a replacement value is configured, depths spelled exactly
/// `-10000.990000` are replaced by it; every other field is kept as read.
#[derive(Debug, Clone, Default)]
pub struct LineFileParser {
    replace_nan_range_value: Option<f64>,
}

impl LineFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the invalid-range sentinel with `value`
    pub fn with_replacement(mut self, value: f64) -> Self {
        self.replace_nan_range_value = Some(value);
        self
    }

    pub fn replacement(&self) -> Option<f64> {
        self.replace_nan_range_value
    }

    /// Parse a line file from disk
    pub fn parse_file(&self, path: &Path) -> Result<LineFile> {
        info!("Parsing line file: {}", path.display());
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Parse a line file from any buffered reader
    pub fn parse_reader<R: BufRead>(&self, reader: R, source_name: &str) -> Result<LineFile> {
        let mut reader = RecordReader::new(reader, source_name);

        let metadata = reader.next_header()?;
        let count = reader.next_count("point count")?;
        debug!(
            "{}: {} {} (tool {}), {} points",
            source_name, metadata.filetype, metadata.format_version, metadata.tool_version, count
        );

        let mut points = Vec::with_capacity(count);
        for i in 0..count {
            let tokens = reader.next_tokens(&format!("point record {} of {}", i + 1, count))?;
            if tokens.len() != LINE_POINT_TOKEN_COUNT {
                return Err(reader.error(format!(
                    "point record needs {} tokens (date time depth status), found {}",
                    LINE_POINT_TOKEN_COUNT,
                    tokens.len()
                )));
            }

            let depth = Depth::from_token_recognising(&tokens[2], &[RangeSentinel::InvalidRange])
                .ok_or_else(|| reader.error(format!("depth '{}' is not a number", tokens[2])))?;
            let depth = match (depth, self.replace_nan_range_value) {
                (Depth::Sentinel(RangeSentinel::InvalidRange), Some(value)) => Depth::Value(value),
                (depth, _) => depth,
            };

            let status = PointStatus::from_code(&tokens[3])
                .ok_or_else(|| reader.error(format!("unknown point status '{}'", tokens[3])))?;

            points.push(TimePoint {
                timestamp: time::composite(&tokens[0], &tokens[1]),
                depth,
                status,
            });
        }

        info!("Parsed {} points from {}", points.len(), source_name);
        Ok(LineFile { metadata, points })
    }
}
