//! CSV and JSON export of parsed annotation files
//!
//! One CSV row per point, with file and region metadata repeated on every
//! row. JSON keeps the parsed structure as-is.

use crate::error::Result;
use crate::models::{LineFile, RegionFile};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct LinePointRow<'a> {
    x: &'a str,
    y: String,
    status: u8,
    filetype: &'a str,
    file_format_number: u32,
    echoview_version: &'a str,
}

#[derive(Serialize)]
struct RegionPointRow<'a> {
    region_id: &'a str,
    point_idx: usize,
    x: &'a str,
    y: String,
    filetype: &'a str,
    file_format_number: u32,
    echoview_version: &'a str,
    structure_version: u32,
    point_count: usize,
    selected: u8,
    creation_type: i32,
    dummy: i32,
    bounding_rectangle_calculated: u8,
    bounding_rectangle_left_x: &'a str,
    bounding_rectangle_top_y: f64,
    bounding_rectangle_right_x: &'a str,
    bounding_rectangle_bottom_y: f64,
    region_classification: &'a str,
    #[serde(rename = "type")]
    region_type: u8,
    name: &'a str,
    notes: String,
    detection_settings: String,
}

/// Write a line file as CSV, one row per point
pub fn write_line_csv<W: Write>(file: &LineFile, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in &file.points {
        csv_writer.serialize(LinePointRow {
            x: &point.timestamp,
            y: point.depth.to_string(),
            status: point.status.code(),
            filetype: &file.metadata.filetype,
            file_format_number: file.metadata.format_version,
            echoview_version: &file.metadata.tool_version,
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a region file as CSV, one row per polygon point
pub fn write_region_csv<W: Write>(file: &RegionFile, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for region in file.regions() {
        let meta = &region.metadata;
        let notes = serde_json::to_string(&region.notes)?;
        let detection_settings = serde_json::to_string(&region.detection_settings)?;

        for (point_idx, point) in region.points.iter().enumerate() {
            csv_writer.serialize(RegionPointRow {
                region_id: &region.id,
                point_idx,
                x: &point.timestamp,
                y: point.depth.to_string(),
                filetype: &file.metadata.filetype,
                file_format_number: file.metadata.format_version,
                echoview_version: &file.metadata.tool_version,
                structure_version: meta.structure_version,
                point_count: meta.point_count,
                selected: meta.selected as u8,
                creation_type: meta.creation_type,
                dummy: meta.dummy,
                bounding_rectangle_calculated: meta.bounding_rectangle_calculated as u8,
                bounding_rectangle_left_x: &meta.bounding_rectangle.left,
                bounding_rectangle_top_y: meta.bounding_rectangle.top,
                bounding_rectangle_right_x: &meta.bounding_rectangle.right,
                bounding_rectangle_bottom_y: meta.bounding_rectangle.bottom,
                region_classification: &meta.classification,
                region_type: meta.region_type.code(),
                name: &meta.name,
                notes: notes.clone(),
                detection_settings: detection_settings.clone(),
            })?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write any parse result as pretty-printed JSON
pub fn write_json<T: Serialize, W: Write>(value: &T, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// Save a line file as `<dir>/<stem>.<ext>`
pub fn save_line_file(
    file: &LineFile,
    output_dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    let path = prepare_output(output_dir, stem, format)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    match format {
        ExportFormat::Csv => write_line_csv(file, &mut writer)?,
        ExportFormat::Json => write_json(file, &mut writer)?,
    }
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Save a region file as `<dir>/<stem>.<ext>`
pub fn save_region_file(
    file: &RegionFile,
    output_dir: &Path,
    stem: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    let path = prepare_output(output_dir, stem, format)?;
    let mut writer = BufWriter::new(File::create(&path)?);
    match format {
        ExportFormat::Csv => write_region_csv(file, &mut writer)?,
        ExportFormat::Json => write_json(file, &mut writer)?,
    }
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Path `save_*` writes to for `stem` in `output_dir`
pub fn output_path(output_dir: &Path, stem: &str, format: ExportFormat) -> PathBuf {
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn prepare_output(output_dir: &Path, stem: &str, format: ExportFormat) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    Ok(output_path(output_dir, stem, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{LineFileParser, RegionFileParser};
    use crate::parser::tests::{LINE_FIXTURE, REGION_FIXTURE, cursor};
    use tempfile::TempDir;

    #[test]
    fn test_line_csv_columns() {
        let file = LineFileParser::new()
            .parse_reader(cursor(LINE_FIXTURE), "fixture.evl")
            .unwrap();
        let mut out = Vec::new();
        write_line_csv(&file, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "x,y,status,filetype,file_format_number,echoview_version"
        );
        assert_eq!(
            lines.next().unwrap(),
            "D20170625T1539223320,9.2447583998,3,EVBD,3,10.0.270.37090"
        );
        assert_eq!(
            lines.next().unwrap(),
            "D20170625T1539230000,-10000.990000,1,EVBD,3,10.0.270.37090"
        );
        assert_eq!(text.lines().count(), 5);
    }

    #[test]
    fn test_region_csv_rows_per_point() {
        let file = RegionFileParser::new()
            .parse_reader(cursor(REGION_FIXTURE), "fixture.evr", false)
            .unwrap();
        let mut out = Vec::new();
        write_region_csv(&file, &mut out).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "region_id");
        assert!(headers.iter().any(|h| h == "type"));

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 7);
        assert_eq!(&rows[0][0], "11");
        assert_eq!(&rows[4][0], "edge-2");
        assert_eq!(&rows[4][3], "-9999.9900000000");

        let notes_col = headers.iter().position(|h| h == "notes").unwrap();
        assert_eq!(&rows[0][notes_col], r#"["first note","second  note"]"#);
    }

    #[test]
    fn test_save_region_json_round_trips() {
        let file = RegionFileParser::new()
            .parse_reader(cursor(REGION_FIXTURE), "fixture.evr", false)
            .unwrap();
        let temp_dir = TempDir::new().unwrap();
        let path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Json).unwrap();

        assert_eq!(path, temp_dir.path().join("x1.json"));
        let loaded: RegionFile = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, file);
        assert!(loaded.region("edge-2").is_some());
    }

    #[test]
    fn test_save_creates_output_directory() {
        let file = LineFileParser::new()
            .parse_reader(cursor(LINE_FIXTURE), "fixture.evl")
            .unwrap();
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("out").join("lines");
        let path = save_line_file(&file, &nested, "track", ExportFormat::Csv).unwrap();
        assert!(path.is_file());
    }
}
