//! Tests for the annotation parsers
//!
//! Fixtures are written in the layout Echoview exports, including the
//! sentinel depths and the blank separators between region blocks.

pub mod line_tests;

use std::io::Cursor;

/// Line file with one point per status code and one invalid-range depth
pub const LINE_FIXTURE: &str = "\
EVBD 3 10.0.270.37090
4
20170625 1539223320 9.2447583998 3
20170625 1539230000 -10000.990000 1
20170625 1539240000 10.5 2
20170625 1539250000 11.25 0
";

/// Region file with a range-edge region and a non-numeric region id
pub const REGION_FIXTURE: &str = "\
EVRG 7 10.0.283.37689
2

13 4 11 0 6 -1 1 20170625 1539223320 9.2447583998 20170625 1539276510 11.7659028389
2
first note
second  note
1
detection setting line
Chicken nugget class
20170625 1539223320 9.2447583998 20170625 1539223320 11.7659028389 20170625 1539276510 11.7659028389 20170625 1539276510 9.2447583998 1
Chicken nugget

13 3 edge-2 1 6 -1 1 20170625 1540000000 -9999.9900000000 20170625 1541000000 9999.9900000000
0
0
Unclassified regions
20170625 1540000000 -9999.9900000000 20170625 1540500000 9999.9900000000 20170625 1541000000 9999.9900000000 4
Range edge
";

pub fn cursor(text: &str) -> Cursor<Vec<u8>> {
    Cursor::new(text.as_bytes().to_vec())
}
