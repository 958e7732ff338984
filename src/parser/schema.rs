//! Positional layout of the 13-token region header record.
//!
//! Every index into the header record goes through [`REGION_HEADER_SCHEMA`];
//! a future format version changes this table and nothing else.

use crate::constants::REGION_HEADER_TOKEN_COUNT;
use crate::models::BoundingRectangle;
use crate::time;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionHeaderField {
    StructureVersion,
    PointCount,
    RegionId,
    Selected,
    CreationType,
    Dummy,
    BoundingRectangleCalculated,
    LeftDate,
    LeftTime,
    Top,
    RightDate,
    RightTime,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Unsigned,
    Integer,
    Flag,
    Identifier,
    Date,
    Time,
    Depth,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: RegionHeaderField,
    pub index: usize,
    pub name: &'static str,
    pub kind: FieldKind,
}

#[rustfmt::skip]
pub const REGION_HEADER_SCHEMA: [FieldSpec; REGION_HEADER_TOKEN_COUNT] = [
    FieldSpec { field: RegionHeaderField::StructureVersion, index: 0, name: "structure_version", kind: FieldKind::Unsigned },
    FieldSpec { field: RegionHeaderField::PointCount, index: 1, name: "point_count", kind: FieldKind::Unsigned },
    FieldSpec { field: RegionHeaderField::RegionId, index: 2, name: "region_id", kind: FieldKind::Identifier },
    FieldSpec { field: RegionHeaderField::Selected, index: 3, name: "selected", kind: FieldKind::Flag },
    FieldSpec { field: RegionHeaderField::CreationType, index: 4, name: "creation_type", kind: FieldKind::Integer },
    FieldSpec { field: RegionHeaderField::Dummy, index: 5, name: "dummy", kind: FieldKind::Integer },
    FieldSpec { field: RegionHeaderField::BoundingRectangleCalculated, index: 6, name: "bounding_rectangle_calculated", kind: FieldKind::Flag },
    FieldSpec { field: RegionHeaderField::LeftDate, index: 7, name: "bounding_rectangle_left_date", kind: FieldKind::Date },
    FieldSpec { field: RegionHeaderField::LeftTime, index: 8, name: "bounding_rectangle_left_time", kind: FieldKind::Time },
    FieldSpec { field: RegionHeaderField::Top, index: 9, name: "bounding_rectangle_top_y", kind: FieldKind::Depth },
    FieldSpec { field: RegionHeaderField::RightDate, index: 10, name: "bounding_rectangle_right_date", kind: FieldKind::Date },
    FieldSpec { field: RegionHeaderField::RightTime, index: 11, name: "bounding_rectangle_right_time", kind: FieldKind::Time },
    FieldSpec { field: RegionHeaderField::Bottom, index: 12, name: "bounding_rectangle_bottom_y", kind: FieldKind::Depth },
];

impl RegionHeaderField {
    pub fn spec(self) -> &'static FieldSpec {
        // Table order matches declaration order
        &REGION_HEADER_SCHEMA[self as usize]
    }
}

/// A header token that does not fit its schema slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub token: String,
    pub reason: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "region header field '{}' = '{}': {}",
            self.field, self.token, self.reason
        )
    }
}

/// Typed view of a region header record
#[derive(Debug, Clone, PartialEq)]
pub struct RegionHeader {
    pub structure_version: u32,
    pub point_count: usize,
    pub region_id: String,
    pub selected: bool,
    pub creation_type: i32,
    pub dummy: i32,
    pub bounding_rectangle_calculated: bool,
    pub bounding_rectangle: BoundingRectangle,
}

impl RegionHeader {
    pub fn from_tokens(tokens: &[String]) -> Result<Self, FieldError> {
        if tokens.len() != REGION_HEADER_TOKEN_COUNT {
            return Err(FieldError {
                field: "region_header",
                token: tokens.join(" "),
                reason: format!(
                    "expected {} tokens, found {}",
                    REGION_HEADER_TOKEN_COUNT,
                    tokens.len()
                ),
            });
        }

        let fields = HeaderTokens(tokens);
        let bounding_rectangle = BoundingRectangle {
            left: time::composite(
                fields.text(RegionHeaderField::LeftDate)?,
                fields.text(RegionHeaderField::LeftTime)?,
            ),
            top: fields.depth(RegionHeaderField::Top)?,
            right: time::composite(
                fields.text(RegionHeaderField::RightDate)?,
                fields.text(RegionHeaderField::RightTime)?,
            ),
            bottom: fields.depth(RegionHeaderField::Bottom)?,
        };

        Ok(Self {
            structure_version: fields.unsigned(RegionHeaderField::StructureVersion)?,
            point_count: fields.unsigned(RegionHeaderField::PointCount)?,
            region_id: fields.text(RegionHeaderField::RegionId)?.to_string(),
            selected: fields.flag(RegionHeaderField::Selected)?,
            creation_type: fields.integer(RegionHeaderField::CreationType)?,
            dummy: fields.integer(RegionHeaderField::Dummy)?,
            bounding_rectangle_calculated: fields
                .flag(RegionHeaderField::BoundingRectangleCalculated)?,
            bounding_rectangle,
        })
    }
}

struct HeaderTokens<'a>(&'a [String]);

impl<'a> HeaderTokens<'a> {
    fn raw(&self, field: RegionHeaderField) -> (&'static FieldSpec, &'a str) {
        let spec = field.spec();
        (spec, self.0[spec.index].as_str())
    }

    fn fail(spec: &FieldSpec, token: &str) -> FieldError {
        let reason = match spec.kind {
            FieldKind::Unsigned => "expected a non-negative integer",
            FieldKind::Integer => "expected an integer",
            FieldKind::Flag => "expected 0 or 1",
            FieldKind::Identifier => "expected a non-empty identifier",
            FieldKind::Date => "expected CCYYMMDD",
            FieldKind::Time => "expected HHmmSSssss",
            FieldKind::Depth => "expected a number",
        };
        FieldError {
            field: spec.name,
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    fn text(&self, field: RegionHeaderField) -> Result<&'a str, FieldError> {
        let (spec, token) = self.raw(field);
        if token.is_empty() {
            return Err(Self::fail(spec, token));
        }
        Ok(token)
    }

    fn unsigned<T: FromStr>(&self, field: RegionHeaderField) -> Result<T, FieldError> {
        let (spec, token) = self.raw(field);
        token.parse::<T>().map_err(|_| Self::fail(spec, token))
    }

    fn integer(&self, field: RegionHeaderField) -> Result<i32, FieldError> {
        let (spec, token) = self.raw(field);
        token.parse().map_err(|_| Self::fail(spec, token))
    }

    fn flag(&self, field: RegionHeaderField) -> Result<bool, FieldError> {
        let (spec, token) = self.raw(field);
        match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(Self::fail(spec, token)),
        }
    }

    fn depth(&self, field: RegionHeaderField) -> Result<f64, FieldError> {
        let (spec, token) = self.raw(field);
        token
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| Self::fail(spec, token))
    }
}
