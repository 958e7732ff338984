//! Echoview timestamp codec.
//!
//! Annotation files store instants as a date token `CCYYMMDD` followed by a
//! time token `HHmmSSssss`, where the optional trailing digits are
//! sub-seconds in units of 0.1 ms. Parsed records carry the composite form
//! `D{date}T{time}`; Simrad raw file names embed the same pair as
//! `-D{date}-T{time}`.

use crate::constants::{DATE_DIGITS, NANOS_PER_SUBSECOND_UNIT, TIME_MAX_DIGITS, TIME_MIN_DIGITS};
use crate::error::{EchoregionsError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static FILENAME_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|-)D(\d{8})-T(\d{6,10})(?:[._-]|$)").expect("static regex is valid")
});

/// Join a date token and a time token into the composite `D{date}T{time}` form
pub fn composite(date: &str, time: &str) -> String {
    format!("D{}T{}", date, time)
}

/// Decode a composite timestamp.
///
/// Accepts `D20170625T1539223320` as well as the space-separated token pair
/// `20170625 1539223320` found in the files themselves.
pub fn decode(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    let (date, time) = if let Some(rest) = trimmed.strip_prefix('D') {
        match rest.split_once('T') {
            Some(parts) => parts,
            None => {
                return Err(EchoregionsError::format(
                    value,
                    "expected D{CCYYMMDD}T{HHmmSSssss}",
                ));
            }
        }
    } else {
        let mut tokens = trimmed.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(date), Some(time), None) => (date, time),
            _ => {
                return Err(EchoregionsError::format(
                    value,
                    "expected D{CCYYMMDD}T{HHmmSSssss} or 'CCYYMMDD HHmmSSssss'",
                ));
            }
        }
    };

    decode_parts(value, date, time)
}

/// Decode the `-D{date}-T{time}` stamp embedded in a Simrad file name
pub fn decode_from_filename(name: impl AsRef<Path>) -> Result<NaiveDateTime> {
    let path = name.as_ref();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let captures = FILENAME_TIMESTAMP.captures(&file_name).ok_or_else(|| {
        EchoregionsError::format(&file_name, "no -D{CCYYMMDD}-T{HHmmSS} token in file name")
    })?;

    decode_parts(&file_name, &captures[1], &captures[2])
}

/// Encode an instant as `D{CCYYMMDD}T{HHmmSSssss}`, truncating below 0.1 ms
pub fn encode(instant: &NaiveDateTime) -> String {
    // Leap-second nanos (>= 1s) fold into the last unit
    let units = (instant.nanosecond().min(999_999_999) / NANOS_PER_SUBSECOND_UNIT).min(9_999);
    format!(
        "D{}T{}{:04}",
        instant.format("%Y%m%d"),
        instant.format("%H%M%S"),
        units
    )
}

fn decode_parts(original: &str, date: &str, time: &str) -> Result<NaiveDateTime> {
    if date.len() != DATE_DIGITS || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EchoregionsError::format(
            original,
            format!("date part '{}' is not {} digits", date, DATE_DIGITS),
        ));
    }
    if !(TIME_MIN_DIGITS..=TIME_MAX_DIGITS).contains(&time.len())
        || !time.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(EchoregionsError::format(
            original,
            format!(
                "time part '{}' is not {} to {} digits",
                time, TIME_MIN_DIGITS, TIME_MAX_DIGITS
            ),
        ));
    }

    let number = |s: &str| -> u32 { s.parse().unwrap_or(0) };

    let year = number(&date[0..4]) as i32;
    let month = number(&date[4..6]);
    let day = number(&date[6..8]);
    let calendar_date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        EchoregionsError::format(original, format!("'{}' is not a calendar date", date))
    })?;

    let hour = number(&time[0..2]);
    let minute = number(&time[2..4]);
    let second = number(&time[4..6]);
    let fraction = &time[TIME_MIN_DIGITS..];
    // Right-pad so "33" means 0.33 s, like "3300"
    let nanos = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<9}", fraction);
        number(&padded)
    };

    let clock = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos).ok_or_else(|| {
        EchoregionsError::format(original, format!("'{}' is not a time of day", time))
    })?;

    Ok(NaiveDateTime::new(calendar_date, clock))
}
