//! Echoview 2D region (.evr) parser.
//!
//! A region file is a header record, a region count, then one block per
//! region:
//!
//! ```text
//! <blank line>
//! <13-token region header>
//! <note count> / <note lines>
//! <detection setting count> / <setting lines>
//! <classification>
//! <date time depth ... type>
//! <name>
//! ```
//!
//! Polygon edges clipped at the instrument range are written as the
//! sentinels `9999.9900000000` and `-9999.9900000000`. With range-edge
//! conversion requested they are replaced by the parser's configured depth
//! bounds.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};

use super::schema::RegionHeader;
use crate::constants::{RAW_FILE_EXTENSION, REGION_POINT_TOKEN_COUNT};
use crate::error::{EchoregionsError, Result};
use crate::models::{Depth, RangeSentinel, Region, RegionFile, RegionMetadata, RegionPoint, RegionType};
use crate::reader::RecordReader;
use crate::time;

/// Minimum and maximum depth used to replace range-edge sentinels.
///
/// When both are set, `min < max` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthBounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl DepthBounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Result<Self> {
        let mut bounds = Self::default();
        if let Some(min) = min {
            bounds.set_min(min)?;
        }
        if let Some(max) = max {
            bounds.set_max(max)?;
        }
        Ok(bounds)
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Set the minimum depth; fails and keeps the old value unless `min < max`
    pub fn set_min(&mut self, value: f64) -> Result<()> {
        if value.is_nan() {
            return Err(EchoregionsError::invalid_value("min_depth cannot be NaN"));
        }
        if let Some(max) = self.max {
            if value >= max {
                return Err(EchoregionsError::invalid_value(format!(
                    "min_depth {} must be less than max_depth {}",
                    value, max
                )));
            }
        }
        self.min = Some(value);
        Ok(())
    }

    /// Set the maximum depth; fails and keeps the old value unless `min < max`
    pub fn set_max(&mut self, value: f64) -> Result<()> {
        if value.is_nan() {
            return Err(EchoregionsError::invalid_value("max_depth cannot be NaN"));
        }
        if let Some(min) = self.min {
            if value <= min {
                return Err(EchoregionsError::invalid_value(format!(
                    "max_depth {} must be greater than min_depth {}",
                    value, min
                )));
            }
        }
        self.max = Some(value);
        Ok(())
    }

    /// Replacement for a range-edge sentinel, if the matching bound is set
    fn substitute(&self, sentinel: RangeSentinel) -> Option<f64> {
        match sentinel {
            RangeSentinel::ExceedsMax => self.max,
            RangeSentinel::ExceedsMin => self.min,
            RangeSentinel::InvalidRange => None,
        }
    }
}

/// Supplies the range profile of a raw sonar file.
///
/// Computing ranges from raw data is outside this crate; implement this for
/// whatever converts raw files in the host application.
pub trait RangeProfileSource {
    fn range_profile(&self, raw_file: &Path, model: &str) -> Result<Vec<f64>>;
}

impl<F> RangeProfileSource for F
where
    F: Fn(&Path, &str) -> Result<Vec<f64>>,
{
    fn range_profile(&self, raw_file: &Path, model: &str) -> Result<Vec<f64>> {
        self(raw_file, model)
    }
}

/// Parser for region files, owning the depth bounds used for range edges
#[derive(Debug, Clone, Default)]
pub struct RegionFileParser {
    bounds: DepthBounds,
}

impl RegionFileParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: DepthBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> DepthBounds {
        self.bounds
    }

    pub fn min_depth(&self) -> Option<f64> {
        self.bounds.min()
    }

    pub fn max_depth(&self) -> Option<f64> {
        self.bounds.max()
    }

    pub fn set_min_depth(&mut self, value: f64) -> Result<()> {
        self.bounds.set_min(value)
    }

    pub fn set_max_depth(&mut self, value: f64) -> Result<()> {
        self.bounds.set_max(value)
    }

    /// Take the depth bounds from the range profile of a raw file
    pub fn derive_depth_bounds_from_profile(
        &mut self,
        raw_file: &Path,
        model: &str,
        source: &impl RangeProfileSource,
    ) -> Result<()> {
        let is_raw = raw_file
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(RAW_FILE_EXTENSION));
        if !is_raw || !raw_file.is_file() {
            return Err(EchoregionsError::invalid_value(format!(
                "Invalid raw file: {}",
                raw_file.display()
            )));
        }

        let profile = source.range_profile(raw_file, model)?;
        let (min, max) = profile
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })
            .ok_or_else(|| {
                EchoregionsError::invalid_value(format!(
                    "range profile of {} has no finite values",
                    raw_file.display()
                ))
            })?;

        self.bounds = DepthBounds::new(Some(min), Some(max))?;
        info!(
            "Depth bounds from {} ({}): {} to {}",
            raw_file.display(),
            model,
            min,
            max
        );
        Ok(())
    }

    /// Parse a region file from disk
    pub fn parse_file(&self, path: &Path, convert_range_edges: bool) -> Result<RegionFile> {
        info!("Parsing region file: {}", path.display());
        let file = File::open(path)?;
        self.parse_reader(
            BufReader::new(file),
            &path.display().to_string(),
            convert_range_edges,
        )
    }

    /// Parse a region file from any buffered reader
    pub fn parse_reader<R: BufRead>(
        &self,
        reader: R,
        source_name: &str,
        convert_range_edges: bool,
    ) -> Result<RegionFile> {
        if convert_range_edges && (self.bounds.min().is_none() || self.bounds.max().is_none()) {
            warn!(
                "Range-edge conversion requested for {} without both depth bounds; unmatched sentinels are kept",
                source_name
            );
        }

        let mut reader = RecordReader::new(reader, source_name);
        let metadata = reader.next_header()?;
        let count = reader.next_count("region count")?;
        debug!(
            "{}: {} {} (tool {}), {} regions",
            source_name, metadata.filetype, metadata.format_version, metadata.tool_version, count
        );

        let mut regions = Vec::with_capacity(count);
        for _ in 0..count {
            let region = self.parse_region(&mut reader, convert_range_edges)?;
            debug!(
                "Region {} '{}': {} points, {:?}",
                region.id,
                region.metadata.name,
                region.points.len(),
                region.metadata.region_type
            );
            regions.push(region);
        }

        let file = RegionFile::new(metadata, regions)
            .map_err(|e| reader.error(e.to_string()))?;
        info!("Parsed {} regions from {}", file.len(), source_name);
        Ok(file)
    }

    fn parse_region<R: BufRead>(
        &self,
        reader: &mut RecordReader<R>,
        convert_range_edges: bool,
    ) -> Result<Region> {
        reader.expect_blank()?;

        let header_tokens = reader.next_tokens("region header")?;
        let header = RegionHeader::from_tokens(&header_tokens)
            .map_err(|e| reader.error(e.to_string()))?;

        if header.bounding_rectangle_calculated {
            let left = time::decode(&header.bounding_rectangle.left)?;
            let right = time::decode(&header.bounding_rectangle.right)?;
            if left > right {
                return Err(reader.error(format!(
                    "bounding rectangle left {} is after right {}",
                    header.bounding_rectangle.left, header.bounding_rectangle.right
                )));
            }
        }

        let note_count = reader.next_count("note count")?;
        let notes = (0..note_count)
            .map(|_| reader.next_line("note line"))
            .collect::<Result<Vec<_>>>()?;

        let setting_count = reader.next_count("detection setting count")?;
        let detection_settings = (0..setting_count)
            .map(|_| reader.next_line("detection setting line"))
            .collect::<Result<Vec<_>>>()?;

        let classification = reader.next_line("region classification")?;

        let mut point_tokens = reader.next_tokens("region points")?;
        let type_code = point_tokens
            .pop()
            .ok_or_else(|| reader.error("points record is empty"))?;
        let region_type = RegionType::from_code(&type_code)
            .ok_or_else(|| reader.error(format!("unknown region type '{}'", type_code)))?;

        if point_tokens.len() % REGION_POINT_TOKEN_COUNT != 0 {
            return Err(reader.error(format!(
                "points record has {} tokens before the type code, not a multiple of {}",
                point_tokens.len(),
                REGION_POINT_TOKEN_COUNT
            )));
        }

        let points = point_tokens
            .chunks_exact(REGION_POINT_TOKEN_COUNT)
            .map(|triple| {
                let depth = Depth::from_token_recognising(
                    &triple[2],
                    &[RangeSentinel::ExceedsMax, RangeSentinel::ExceedsMin],
                )
                .ok_or_else(|| reader.error(format!("depth '{}' is not a number", triple[2])))?;
                Ok(RegionPoint {
                    timestamp: time::composite(&triple[0], &triple[1]),
                    depth: self.convert_depth(depth, convert_range_edges),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if points.len() != header.point_count {
            return Err(reader.error(format!(
                "region {} declares {} points but lists {}",
                header.region_id,
                header.point_count,
                points.len()
            )));
        }

        let name = reader.next_line("region name")?;

        Ok(Region {
            id: header.region_id,
            metadata: RegionMetadata {
                structure_version: header.structure_version,
                point_count: header.point_count,
                selected: header.selected,
                creation_type: header.creation_type,
                dummy: header.dummy,
                bounding_rectangle_calculated: header.bounding_rectangle_calculated,
                bounding_rectangle: header.bounding_rectangle,
                classification,
                region_type,
                name,
            },
            notes,
            detection_settings,
            points,
        })
    }

    fn convert_depth(&self, depth: Depth, convert_range_edges: bool) -> Depth {
        match depth {
            Depth::Sentinel(sentinel) if convert_range_edges => self
                .bounds
                .substitute(sentinel)
                .map(Depth::Value)
                .unwrap_or(depth),
            depth => depth,
        }
    }
}
