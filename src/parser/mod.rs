//! Parsers for Echoview annotation files
//!
//! Both formats are read record by record through
//! [`RecordReader`](crate::reader::RecordReader); a malformed record fails
//! the whole file and no partial result is returned.
//!
//! - [`line`] - point sequences (.evl)
//! - [`region`] - polygon regions (.evr) and the depth bounds used for range edges
//! - [`schema`] - positional layout of the region header record

pub mod line;
pub mod region;
pub mod schema;

#[cfg(test)]
pub mod tests;

pub use line::LineFileParser;
pub use region::{DepthBounds, RangeProfileSource, RegionFileParser};
pub use schema::{REGION_HEADER_SCHEMA, RegionHeader, RegionHeaderField};
