//! Line file parser tests

use super::{LINE_FIXTURE, cursor};
use crate::error::EchoregionsError;
use crate::models::{Depth, PointStatus, RangeSentinel};
use crate::parser::LineFileParser;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_parse_minimal_line_file_with_replacement() {
    let text = "EVL 7 1.0.0\n1\n20170625 1539223320 -10000.990000 1\n";
    let parsed = LineFileParser::new()
        .with_replacement(0.0)
        .parse_reader(cursor(text), "minimal.evl")
        .unwrap();

    assert_eq!(parsed.metadata.filetype, "EVL");
    assert_eq!(parsed.metadata.format_version, 7);
    assert_eq!(parsed.metadata.tool_version, "1.0.0");
    assert_eq!(parsed.points.len(), 1);
    assert_eq!(parsed.points[0].depth, Depth::Value(0.0));
    assert_eq!(parsed.points[0].status, PointStatus::Unverified);
    assert_eq!(parsed.points[0].timestamp, "D20170625T1539223320");
}

#[test]
fn test_points_keep_file_order_and_fields() {
    let parsed = LineFileParser::new()
        .parse_reader(cursor(LINE_FIXTURE), "fixture.evl")
        .unwrap();

    let statuses: Vec<_> = parsed.points.iter().map(|p| p.status).collect();
    assert_eq!(
        statuses,
        vec![
            PointStatus::Good,
            PointStatus::Unverified,
            PointStatus::Bad,
            PointStatus::None
        ]
    );
    assert_eq!(parsed.points[0].depth, Depth::Value(9.2447583998));
    assert_eq!(parsed.points[2].timestamp, "D20170625T1539240000");
}

#[test]
fn test_sentinel_kept_without_replacement() {
    let parsed = LineFileParser::new()
        .parse_reader(cursor(LINE_FIXTURE), "fixture.evl")
        .unwrap();
    assert_eq!(
        parsed.points[1].depth,
        Depth::Sentinel(RangeSentinel::InvalidRange)
    );
    assert_eq!(parsed.points[1].status, PointStatus::Unverified);
}

#[test]
fn test_replacement_is_lexical() {
    let text = "EVBD 3 10.0\n2\n20170625 1539223320 -10000.99 1\n20170625 1539223320 -10000.990000 1\n";
    let parsed = LineFileParser::new()
        .with_replacement(42.0)
        .parse_reader(cursor(text), "lexical.evl")
        .unwrap();

    // Numerically equal but differently spelled: not a sentinel
    assert_eq!(parsed.points[0].depth, Depth::Value(-10000.99));
    assert_eq!(parsed.points[1].depth, Depth::Value(42.0));
}

#[test]
fn test_region_sentinels_are_plain_depths_in_line_files() {
    let text = "EVBD 3 10.0\n1\n20170625 1539223320 9999.9900000000 3\n";
    let parsed = LineFileParser::new()
        .with_replacement(1.0)
        .parse_reader(cursor(text), "edge.evl")
        .unwrap();
    assert_eq!(parsed.points[0].depth, Depth::Value(9999.99));
}

#[test]
fn test_point_time_decodes() {
    let parsed = LineFileParser::new()
        .parse_reader(cursor(LINE_FIXTURE), "fixture.evl")
        .unwrap();
    let t = parsed.points[0].time().unwrap();
    assert_eq!(t.to_string(), "2017-06-25 15:39:22.332");
}

#[test]
fn test_truncated_points() {
    let text = "EVBD 3 10.0\n3\n20170625 1539223320 1.0 1\n";
    match LineFileParser::new().parse_reader(cursor(text), "short.evl") {
        Err(EchoregionsError::TruncatedFile {
            source_name, line, ..
        }) => {
            assert_eq!(source_name, "short.evl");
            assert_eq!(line, 4);
        }
        other => panic!("Expected TruncatedFile error, got {:?}", other),
    }
}

#[test]
fn test_malformed_count() {
    let text = "EVBD 3 10.0\nmany\n";
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(text), "count.evl"),
        Err(EchoregionsError::Parse { line: 2, .. })
    ));
}

#[test]
fn test_short_record() {
    let text = "EVBD 3 10.0\n1\n20170625 1539223320 1.0\n";
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(text), "short.evl"),
        Err(EchoregionsError::Parse { line: 3, .. })
    ));
}

#[test]
fn test_bad_depth_and_status() {
    let bad_depth = "EVBD 3 10.0\n1\n20170625 1539223320 deep 1\n";
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(bad_depth), "depth.evl"),
        Err(EchoregionsError::Parse { .. })
    ));

    let nan_depth = "EVBD 3 10.0\n1\n20170625 1539223320 NaN 1\n";
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(nan_depth), "nan.evl"),
        Err(EchoregionsError::Parse { .. })
    ));

    let bad_status = "EVBD 3 10.0\n1\n20170625 1539223320 1.0 9\n";
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(bad_status), "status.evl"),
        Err(EchoregionsError::Parse { .. })
    ));
}

#[test]
fn test_empty_file() {
    assert!(matches!(
        LineFileParser::new().parse_reader(cursor(""), "empty.evl"),
        Err(EchoregionsError::TruncatedFile { line: 1, .. })
    ));
}

#[test]
fn test_parse_file_from_disk() {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", LINE_FIXTURE).unwrap();

    let parsed = LineFileParser::new().parse_file(temp_file.path()).unwrap();
    assert_eq!(parsed.metadata.filetype, "EVBD");
    assert_eq!(parsed.points.len(), 4);
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.evl");
    assert!(matches!(
        LineFileParser::new().parse_file(&missing),
        Err(EchoregionsError::Io(_))
    ));
}
