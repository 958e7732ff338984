//! Region selection, sonar-file selection and point lookup.

use crate::error::{EchoregionsError, Result};
use crate::models::{Depth, Region, RegionFile, RegionPoint};
use crate::time;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Criteria for [`select_regions`]; unset criteria match every region.
///
/// Ranges are given as `[start, end]` slices so an argument of the wrong
/// shape can be reported rather than silently truncated.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegionFilter<'a> {
    pub region_ids: Option<&'a [String]>,
    pub time_range: Option<&'a [NaiveDateTime]>,
    pub depth_range: Option<&'a [f64]>,
}

impl<'a> RegionFilter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region_ids(mut self, ids: &'a [String]) -> Self {
        self.region_ids = Some(ids);
        self
    }

    pub fn with_time_range(mut self, range: &'a [NaiveDateTime]) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_depth_range(mut self, range: &'a [f64]) -> Self {
        self.depth_range = Some(range);
        self
    }
}

/// Regions of `file` matching every criterion of `filter`, in file order.
///
/// A region matches a time range when all its points lie inside it, and a
/// depth range when all its depths do. Unsubstituted sentinels compare by
/// their numeric value.
pub fn select_regions<'f>(file: &'f RegionFile, filter: &RegionFilter<'_>) -> Result<Vec<&'f Region>> {
    if let Some(ids) = filter.region_ids {
        if ids.is_empty() {
            return Err(EchoregionsError::invalid_value("region_ids must not be empty"));
        }
    }
    let time_range = filter
        .time_range
        .map(|range| range_pair(range, "time_range"))
        .transpose()?;
    let depth_range = filter
        .depth_range
        .map(|range| range_pair(range, "depth_range"))
        .transpose()?;

    let mut selected = Vec::new();
    for region in file.regions() {
        if let Some(ids) = filter.region_ids {
            if !ids.iter().any(|id| *id == region.id) {
                continue;
            }
        }
        if let Some((start, end)) = time_range {
            let mut inside = true;
            for point in &region.points {
                let t = point.time()?;
                if t < start || t > end {
                    inside = false;
                    break;
                }
            }
            if !inside {
                continue;
            }
        }
        if let Some((min, max)) = depth_range {
            let inside = region.points.iter().all(|p| {
                let depth = numeric_depth(&p.depth);
                depth >= min && depth <= max
            });
            if !inside {
                continue;
            }
        }
        selected.push(region);
    }

    debug!("Selected {} of {} regions", selected.len(), file.len());
    Ok(selected)
}

/// Sonar files whose recordings cover the selected regions.
///
/// File names carry their start time as `-D{date}-T{time}`. Files are
/// ordered by start time; the result runs from the last file starting at
/// or before the earliest region point to the last file starting at or
/// before the latest one.
pub fn select_sonar_files(
    file_names: &[String],
    file: &RegionFile,
    region_ids: &[String],
) -> Result<Vec<String>> {
    if region_ids.is_empty() {
        return Err(EchoregionsError::invalid_value("region_ids must not be empty"));
    }

    let mut extent: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for id in region_ids {
        let region = file
            .region(id)
            .ok_or_else(|| EchoregionsError::invalid_value(format!("unknown region id '{}'", id)))?;
        if let Some((lo, hi)) = region.time_extent()? {
            extent = Some(match extent {
                Some((a, b)) => (a.min(lo), b.max(hi)),
                None => (lo, hi),
            });
        }
    }
    let Some((region_start, region_end)) = extent else {
        return Ok(Vec::new());
    };

    let mut stamped = file_names
        .iter()
        .map(|name| Ok((time::decode_from_filename(name)?, name)))
        .collect::<Result<Vec<_>>>()?;
    stamped.sort_by_key(|(start, _)| *start);

    let Some(last) = stamped.iter().rposition(|(start, _)| *start <= region_end) else {
        return Ok(Vec::new());
    };
    let first = stamped
        .iter()
        .rposition(|(start, _)| *start <= region_start)
        .unwrap_or(0);

    Ok(stamped[first..=last]
        .iter()
        .map(|(_, name)| (*name).clone())
        .collect())
}

/// Where [`lookup_points`] reads a region's points from
#[derive(Debug, Clone, Copy)]
pub enum PointSource<'a> {
    /// Region CSV written by [`crate::export::write_region_csv`]
    Csv(&'a Path),
    /// Region JSON written by [`crate::export::write_json`]
    Json(&'a Path),
    Parsed(&'a RegionFile),
}

#[derive(Deserialize)]
struct PointRow {
    region_id: String,
    point_idx: usize,
    x: String,
    y: String,
}

/// Ordered points of one region; all sources give the same result.
///
/// The one exception is a region with no points: CSV export writes no rows
/// for it, so a [`PointSource::Csv`] lookup reports the id as absent
/// (`InvalidValue`) while the JSON and parsed sources return an empty list.
pub fn lookup_points(region_id: &str, source: PointSource<'_>) -> Result<Vec<RegionPoint>> {
    match source {
        PointSource::Parsed(file) => points_from_parsed(region_id, file),
        PointSource::Json(path) => {
            let reader = BufReader::new(open_existing(path)?);
            let file: RegionFile = serde_json::from_reader(reader)?;
            points_from_parsed(region_id, &file)
        }
        PointSource::Csv(path) => {
            let mut reader = csv::Reader::from_reader(open_existing(path)?);
            let mut rows = Vec::new();
            for row in reader.deserialize() {
                let row: PointRow = row?;
                if row.region_id == region_id {
                    rows.push(row);
                }
            }
            if rows.is_empty() {
                return Err(unknown_region(region_id, &path.display().to_string()));
            }
            rows.sort_by_key(|r| r.point_idx);
            rows.into_iter()
                .map(|row| {
                    let depth = Depth::from_token(&row.y)
                        .ok_or_else(|| EchoregionsError::format(&row.y, "depth is not a number"))?;
                    Ok(RegionPoint {
                        timestamp: row.x,
                        depth,
                    })
                })
                .collect()
        }
    }
}

fn points_from_parsed(region_id: &str, file: &RegionFile) -> Result<Vec<RegionPoint>> {
    file.region(region_id)
        .map(|region| region.points.clone())
        .ok_or_else(|| unknown_region(region_id, "parsed region file"))
}

fn open_existing(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(EchoregionsError::invalid_value(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(File::open(path)?)
}

fn unknown_region(region_id: &str, source: &str) -> EchoregionsError {
    EchoregionsError::invalid_value(format!("region id '{}' not found in {}", region_id, source))
}

fn range_pair<T: Copy + PartialOrd + std::fmt::Debug>(range: &[T], name: &str) -> Result<(T, T)> {
    match range {
        [start, end] if start <= end => Ok((*start, *end)),
        [start, end] => Err(EchoregionsError::invalid_value(format!(
            "{} start {:?} is after end {:?}",
            name, start, end
        ))),
        _ => Err(EchoregionsError::invalid_type(format!(
            "{} must hold exactly two values, got {}",
            name,
            range.len()
        ))),
    }
}

fn numeric_depth(depth: &Depth) -> f64 {
    match depth {
        Depth::Value(v) => *v,
        Depth::Sentinel(s) => s.value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportFormat, save_region_file};
    use crate::parser::RegionFileParser;
    use crate::parser::tests::{REGION_FIXTURE, cursor};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn fixture() -> RegionFile {
        RegionFileParser::new()
            .parse_reader(cursor(REGION_FIXTURE), "fixture.evr", false)
            .unwrap()
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 6, 25)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_by_id() {
        let file = fixture();
        let wanted = ids(&["edge-2"]);
        let selected = select_regions(&file, &RegionFilter::new().with_region_ids(&wanted)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "edge-2");
    }

    #[test]
    fn test_select_by_time_range_requires_all_points_inside() {
        let file = fixture();
        let range = [at(15, 39, 0), at(15, 39, 59)];
        let selected = select_regions(&file, &RegionFilter::new().with_time_range(&range)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "11");
    }

    #[test]
    fn test_select_by_depth_range() {
        let file = fixture();
        let wide = [-10000.0, 10000.0];
        assert_eq!(
            select_regions(&file, &RegionFilter::new().with_depth_range(&wide))
                .unwrap()
                .len(),
            2
        );

        let shallow = [0.0, 20.0];
        let selected = select_regions(&file, &RegionFilter::new().with_depth_range(&shallow)).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "11");
    }

    #[test]
    fn test_select_rejects_bad_arguments() {
        let file = fixture();
        let empty: Vec<String> = vec![];
        assert!(matches!(
            select_regions(&file, &RegionFilter::new().with_region_ids(&empty)),
            Err(EchoregionsError::InvalidValue { .. })
        ));

        let no_range: [f64; 0] = [];
        assert!(matches!(
            select_regions(&file, &RegionFilter::new().with_depth_range(&no_range)),
            Err(EchoregionsError::InvalidType { .. })
        ));

        let too_long = [at(1, 0, 0), at(2, 0, 0), at(3, 0, 0)];
        assert!(matches!(
            select_regions(&file, &RegionFilter::new().with_time_range(&too_long)),
            Err(EchoregionsError::InvalidType { .. })
        ));

        let inverted = [10.0, 1.0];
        assert!(matches!(
            select_regions(&file, &RegionFilter::new().with_depth_range(&inverted)),
            Err(EchoregionsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_select_sonar_files() {
        let file = fixture();
        let names = ids(&[
            "Summer2017-D20170625-T160000.raw",
            "Summer2017-D20170625-T124834.raw",
            "Summer2017-D20170625-T150000.raw",
            "Summer2017-D20170625-T153000.raw",
            "Summer2017-D20170625-T154030.raw",
        ]);

        // Region 11 spans 15:39:22 to 15:39:27
        let selected = select_sonar_files(&names, &file, &ids(&["11"])).unwrap();
        assert_eq!(selected, ids(&["Summer2017-D20170625-T153000.raw"]));

        // edge-2 spans 15:40:00 to 15:41:00 and crosses a file boundary
        let selected = select_sonar_files(&names, &file, &ids(&["11", "edge-2"])).unwrap();
        assert_eq!(
            selected,
            ids(&[
                "Summer2017-D20170625-T153000.raw",
                "Summer2017-D20170625-T154030.raw"
            ])
        );
    }

    #[test]
    fn test_select_sonar_files_before_any_file() {
        let file = fixture();
        let names = ids(&["Summer2017-D20170626-T000000.raw"]);
        assert!(select_sonar_files(&names, &file, &ids(&["11"])).unwrap().is_empty());
        assert!(select_sonar_files(&names, &file, &ids(&["99"])).is_err());
    }

    #[test]
    fn test_lookup_points_agrees_across_sources() {
        let file = fixture();
        let temp_dir = TempDir::new().unwrap();
        let csv_path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Csv).unwrap();
        let json_path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Json).unwrap();

        for id in ["11", "edge-2"] {
            let parsed = lookup_points(id, PointSource::Parsed(&file)).unwrap();
            assert_eq!(lookup_points(id, PointSource::Csv(&csv_path)).unwrap(), parsed);
            assert_eq!(lookup_points(id, PointSource::Json(&json_path)).unwrap(), parsed);
        }
    }

    #[test]
    fn test_lookup_points_of_region_without_points() {
        let text = "\
EVRG 7 10.0.283.37689
2

13 0 empty 0 6 -1 0 20170625 1539223320 1.0 20170625 1539223320 2.0
0
0
Unclassified regions
1
Nothing here

13 1 dot 0 6 -1 0 20170625 1539223320 5.0 20170625 1539223320 5.0
0
0
Unclassified regions
20170625 1539223320 5.0 2
Marker
";
        let file = RegionFileParser::new()
            .parse_reader(cursor(text), "empty.evr", false)
            .unwrap();
        let temp_dir = TempDir::new().unwrap();
        let csv_path = save_region_file(&file, temp_dir.path(), "empty", ExportFormat::Csv).unwrap();
        let json_path =
            save_region_file(&file, temp_dir.path(), "empty", ExportFormat::Json).unwrap();

        assert!(lookup_points("empty", PointSource::Parsed(&file)).unwrap().is_empty());
        assert!(lookup_points("empty", PointSource::Json(&json_path)).unwrap().is_empty());
        assert!(matches!(
            lookup_points("empty", PointSource::Csv(&csv_path)),
            Err(EchoregionsError::InvalidValue { .. })
        ));
        assert_eq!(lookup_points("dot", PointSource::Csv(&csv_path)).unwrap().len(), 1);
    }

    #[test]
    fn test_lookup_points_absent_region_in_csv() {
        let file = fixture();
        let temp_dir = TempDir::new().unwrap();
        let csv_path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Csv).unwrap();

        assert!(matches!(
            lookup_points("404", PointSource::Csv(&csv_path)),
            Err(EchoregionsError::InvalidValue { .. })
        ));
        assert!(matches!(
            lookup_points("404", PointSource::Parsed(&file)),
            Err(EchoregionsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_lookup_points_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.csv");
        assert!(matches!(
            lookup_points("11", PointSource::Csv(&missing)),
            Err(EchoregionsError::InvalidValue { .. })
        ));
    }
}
