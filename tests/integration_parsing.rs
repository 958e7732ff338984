//! End-to-end tests: parse annotation files from disk, export them, and read
//! region points back through every point source.

use echoregions::export::{ExportFormat, save_line_file, save_region_file};
use echoregions::query::{PointSource, lookup_points};
use echoregions::{
    Depth, EchoregionsError, LineFileParser, MaskGrid, PointStatus, RegionFileParser, RegionType,
    from_one_hot, parse_batch, rasterize_regions, to_one_hot,
};
use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const X1_EVR: &str = "\
EVRG 7 10.0.283.37689
2

13 4 11 0 6 -1 1 20170625 1539223320 9.2447583998 20170625 1539276510 11.7659028389
0
0
Unclassified regions
20170625 1539223320 9.2447583998 20170625 1539223320 11.7659028389 20170625 1539276510 11.7659028389 20170625 1539276510 9.2447583998 1
Chicken nugget

13 4 12 0 6 -1 1 20170625 1539300000 -9999.9900000000 20170625 1539400000 9999.9900000000
1
ping range edge
0
Unclassified regions
20170625 1539300000 -9999.9900000000 20170625 1539300000 9999.9900000000 20170625 1539400000 9999.9900000000 20170625 1539400000 -9999.9900000000 4
Bad data
";

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_minimal_line_file_with_replacement() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "minimal.evl",
        "EVL 7 1.0.0\n1\n20170625 1539223320 -10000.990000 1\n",
    );

    let parsed = LineFileParser::new()
        .with_replacement(0.0)
        .parse_file(&path)
        .unwrap();
    assert_eq!(parsed.points.len(), 1);
    assert_eq!(parsed.points[0].depth, Depth::Value(0.0));
    assert_eq!(parsed.points[0].status, PointStatus::Unverified);

    let out = save_line_file(&parsed, temp_dir.path(), "minimal", ExportFormat::Csv).unwrap();
    let csv = fs::read_to_string(out).unwrap();
    assert!(csv.ends_with("D20170625T1539223320,0,1,EVL,7,1.0.0\n"));
}

#[test]
fn test_region_file_round_trip_through_exports() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "x1.evr", X1_EVR);

    let file = RegionFileParser::new().parse_file(&path, false).unwrap();
    assert_eq!(file.len(), 2);
    assert_eq!(
        file.region("11").unwrap().metadata.region_type,
        RegionType::Analysis
    );
    assert_eq!(file.region("12").unwrap().notes, vec!["ping range edge"]);

    let csv_path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Csv).unwrap();
    let json_path = save_region_file(&file, temp_dir.path(), "x1", ExportFormat::Json).unwrap();

    for id in ["11", "12"] {
        let parsed = lookup_points(id, PointSource::Parsed(&file)).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(lookup_points(id, PointSource::Csv(&csv_path)).unwrap(), parsed);
        assert_eq!(lookup_points(id, PointSource::Json(&json_path)).unwrap(), parsed);
    }

    assert!(matches!(
        lookup_points("13", PointSource::Csv(&csv_path)),
        Err(EchoregionsError::InvalidValue { .. })
    ));
}

#[test]
fn test_converted_regions_rasterize_and_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "x1.evr", X1_EVR);

    let mut parser = RegionFileParser::new();
    parser.set_min_depth(0.0).unwrap();
    parser.set_max_depth(20.0).unwrap();
    let file = parser.parse_file(&path, true).unwrap();
    assert_eq!(
        file.region("12").unwrap().points[0].depth,
        Depth::Value(0.0)
    );

    let start = file.region("11").unwrap().points[0].time().unwrap();
    let times = (0..20)
        .map(|s| start + chrono::Duration::seconds(s))
        .collect::<Vec<_>>();
    let grid = MaskGrid::new(times, vec![5.0, 10.0, 15.0]);

    let ids = vec!["11".to_string(), "12".to_string()];
    let raster = rasterize_regions(&file, &ids, None, &grid).unwrap();
    assert_eq!(raster.labels(), vec![11.0, 12.0]);

    let stack = to_one_hot(&raster);
    assert_eq!(stack.labels(), &[11.0, 12.0]);
    assert_eq!(from_one_hot(&stack).unwrap(), raster);
}

#[tokio::test]
async fn test_batch_skips_failed_files() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write(temp_dir.path(), "a.evr", X1_EVR),
        write(temp_dir.path(), "b.evr", "EVRG 7 10.0\n1\n"),
        write(temp_dir.path(), "c.evr", X1_EVR),
    ];

    let parser = RegionFileParser::new();
    let outcome = parse_batch(&paths, 2, &ProgressBar::hidden(), move |path| {
        parser.parse_file(path, false)
    })
    .await;

    assert_eq!(outcome.parsed_count(), 2);
    assert_eq!(outcome.failed_count(), 1);
    assert_eq!(outcome.failed[0].0, paths[1]);
    assert_eq!(outcome.parsed[1].0, paths[2]);
}
