//! Format constants for Echoview annotation files
//!
//! This module contains the reserved sentinel literals, file-type markers,
//! record layout sizes and processing defaults used throughout the crate.

// =============================================================================
// File Formats
// =============================================================================

/// Extension of Echoview line (point sequence) files
pub const LINE_FILE_EXTENSION: &str = "evl";

/// Extension of Echoview 2D region (polygon) files
pub const REGION_FILE_EXTENSION: &str = "evr";

/// Extension of raw sonar files accepted by the range-profile collaborator
pub const RAW_FILE_EXTENSION: &str = "raw";

/// Number of tokens in a file header record (filetype, format version, tool version)
pub const HEADER_TOKEN_COUNT: usize = 3;

/// Number of tokens in a line-file point record (date, time, depth, status)
pub const LINE_POINT_TOKEN_COUNT: usize = 4;

/// Number of tokens in a region header record
pub const REGION_HEADER_TOKEN_COUNT: usize = 13;

/// Number of tokens per point in a region points record (date, time, depth)
pub const REGION_POINT_TOKEN_COUNT: usize = 3;

// =============================================================================
// Sentinel Depths
// =============================================================================

/// Reserved depth literals, matched lexically against file tokens
pub mod sentinels {
    /// Line files: depth outside the valid range of the echogram
    pub const INVALID_RANGE: &str = "-10000.990000";

    /// Region files: polygon edge clipped at the maximum sensing range
    pub const EXCEEDS_MAX: &str = "9999.9900000000";

    /// Region files: polygon edge clipped at the minimum sensing range
    pub const EXCEEDS_MIN: &str = "-9999.9900000000";
}

// =============================================================================
// Timestamps
// =============================================================================

/// Digits in the CCYYMMDD date part of a timestamp
pub const DATE_DIGITS: usize = 8;

/// Digits in the HHmmSS part of a timestamp, before any sub-second digits
pub const TIME_MIN_DIGITS: usize = 6;

/// HHmmSS plus four sub-second digits in units of 0.1 ms
pub const TIME_MAX_DIGITS: usize = 10;

/// Nanoseconds per sub-second unit (0.1 ms)
pub const NANOS_PER_SUBSECOND_UNIT: u32 = 100_000;

// =============================================================================
// Processing Defaults
// =============================================================================

/// Default log filter directive for the binary
pub const DEFAULT_LOG_FILTER: &str = "echoregions=info";
