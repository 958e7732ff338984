//! Core data structures for parsed annotation files.
//!
//! Defines file metadata, line points, regions and their metadata, plus the
//! depth representation that keeps reserved sentinel literals distinct from
//! measured values.

use crate::constants::sentinels;
use crate::error::{EchoregionsError, Result};
use crate::time;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Header record shared by both annotation formats
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub filetype: String,
    pub format_version: u32,
    pub tool_version: String,
}

/// Reserved depth values meaning "outside the representable range"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeSentinel {
    /// Line files: depth outside the echogram's valid range
    #[serde(rename = "-10000.990000")]
    InvalidRange,
    /// Region files: edge clipped at the maximum range
    #[serde(rename = "9999.9900000000")]
    ExceedsMax,
    /// Region files: edge clipped at the minimum range
    #[serde(rename = "-9999.9900000000")]
    ExceedsMin,
}

impl RangeSentinel {
    pub const ALL: [RangeSentinel; 3] = [
        RangeSentinel::InvalidRange,
        RangeSentinel::ExceedsMax,
        RangeSentinel::ExceedsMin,
    ];

    /// Exact literal as written by Echoview
    pub fn literal(&self) -> &'static str {
        match self {
            RangeSentinel::InvalidRange => sentinels::INVALID_RANGE,
            RangeSentinel::ExceedsMax => sentinels::EXCEEDS_MAX,
            RangeSentinel::ExceedsMin => sentinels::EXCEEDS_MIN,
        }
    }

    /// Lexical match against a file token; numerically equal spellings do not match
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            sentinels::INVALID_RANGE => Some(RangeSentinel::InvalidRange),
            sentinels::EXCEEDS_MAX => Some(RangeSentinel::ExceedsMax),
            sentinels::EXCEEDS_MIN => Some(RangeSentinel::ExceedsMin),
            _ => None,
        }
    }

    /// Numeric value of the literal
    pub fn value(&self) -> f64 {
        match self {
            RangeSentinel::InvalidRange => -10000.99,
            RangeSentinel::ExceedsMax => 9999.99,
            RangeSentinel::ExceedsMin => -9999.99,
        }
    }
}

/// A depth as read from a file: a measurement or an unsubstituted sentinel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Depth {
    Value(f64),
    Sentinel(RangeSentinel),
}

impl Depth {
    /// Parse a depth token, recognising every sentinel literal lexically
    pub fn from_token(token: &str) -> Option<Self> {
        Self::from_token_recognising(token, &RangeSentinel::ALL)
    }

    /// Parse a depth token, recognising only the given sentinel literals.
    /// Non-finite values (`NaN`, `inf`) are not depths.
    pub fn from_token_recognising(token: &str, recognised: &[RangeSentinel]) -> Option<Self> {
        match RangeSentinel::from_token(token) {
            Some(sentinel) if recognised.contains(&sentinel) => Some(Depth::Sentinel(sentinel)),
            _ => token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Depth::Value),
        }
    }

    /// Measured value, `None` for an unsubstituted sentinel
    pub fn value(&self) -> Option<f64> {
        match self {
            Depth::Value(v) => Some(*v),
            Depth::Sentinel(_) => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Depth::Sentinel(_))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Value(v) => write!(f, "{}", v),
            Depth::Sentinel(s) => f.write_str(s.literal()),
        }
    }
}

/// Verification status of a line point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointStatus {
    None = 0,
    Unverified = 1,
    Bad = 2,
    Good = 3,
}

impl PointStatus {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(PointStatus::None),
            "1" => Some(PointStatus::Unverified),
            "2" => Some(PointStatus::Bad),
            "3" => Some(PointStatus::Good),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// One timestamped depth of a line file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Composite `D{date}T{time}` string, decoded on demand
    pub timestamp: String,
    pub depth: Depth,
    pub status: PointStatus,
}

impl TimePoint {
    pub fn time(&self) -> Result<NaiveDateTime> {
        time::decode(&self.timestamp)
    }
}

/// Parsed line file: header plus ordered points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineFile {
    pub metadata: FileMetadata,
    pub points: Vec<TimePoint>,
}

/// Region classification code from the points record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionType {
    NoData = 0,
    Analysis = 1,
    Marker = 2,
    FishTracks = 3,
    BadEmptyWater = 4,
}

impl RegionType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(RegionType::NoData),
            "1" => Some(RegionType::Analysis),
            "2" => Some(RegionType::Marker),
            "3" => Some(RegionType::FishTracks),
            "4" => Some(RegionType::BadEmptyWater),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Bounding rectangle from the region header.
///
/// `top <= bottom` is not guaranteed by the format; treat as informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingRectangle {
    pub left: String,
    pub top: f64,
    pub right: String,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetadata {
    pub structure_version: u32,
    pub point_count: usize,
    pub selected: bool,
    pub creation_type: i32,
    pub dummy: i32,
    pub bounding_rectangle_calculated: bool,
    pub bounding_rectangle: BoundingRectangle,
    pub classification: String,
    pub region_type: RegionType,
    pub name: String,
}

/// One polygon vertex in time-depth space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPoint {
    pub timestamp: String,
    pub depth: Depth,
}

impl RegionPoint {
    pub fn time(&self) -> Result<NaiveDateTime> {
        time::decode(&self.timestamp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: String,
    pub metadata: RegionMetadata,
    pub notes: Vec<String>,
    pub detection_settings: Vec<String>,
    pub points: Vec<RegionPoint>,
}

impl Region {
    /// Earliest and latest vertex times
    pub fn time_extent(&self) -> Result<Option<(NaiveDateTime, NaiveDateTime)>> {
        let mut extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
        for point in &self.points {
            let t = point.time()?;
            extent = Some(match extent {
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
                None => (t, t),
            });
        }
        Ok(extent)
    }
}

/// Parsed region file: header plus regions in file order, indexed by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RegionFileRecord", into = "RegionFileRecord")]
pub struct RegionFile {
    pub metadata: FileMetadata,
    regions: Vec<Region>,
    index: HashMap<String, usize>,
}

impl RegionFile {
    /// Build from regions in file order; region ids must be unique
    pub fn new(metadata: FileMetadata, regions: Vec<Region>) -> Result<Self> {
        let mut index = HashMap::with_capacity(regions.len());
        for (position, region) in regions.iter().enumerate() {
            if index.insert(region.id.clone(), position).is_some() {
                return Err(EchoregionsError::invalid_value(format!(
                    "duplicate region id '{}'",
                    region.id
                )));
            }
        }
        Ok(Self {
            metadata,
            regions,
            index,
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.index.get(id).map(|&i| &self.regions[i])
    }

    pub fn region_ids(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Serialized shape of a region file; the id index is rebuilt on load
#[derive(Serialize, Deserialize)]
struct RegionFileRecord {
    metadata: FileMetadata,
    regions: Vec<Region>,
}

impl From<RegionFile> for RegionFileRecord {
    fn from(file: RegionFile) -> Self {
        Self {
            metadata: file.metadata,
            regions: file.regions,
        }
    }
}

impl TryFrom<RegionFileRecord> for RegionFile {
    type Error = EchoregionsError;

    fn try_from(record: RegionFileRecord) -> Result<Self> {
        RegionFile::new(record.metadata, record.regions)
    }
}
