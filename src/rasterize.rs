//! Rasterization of region polygons onto a time × depth grid.
//!
//! Each grid cell is labelled with the region whose polygon contains the
//! cell's (time, depth) coordinate under the even-odd rule. Times are
//! measured in seconds from the first grid time.

use crate::error::{EchoregionsError, Result};
use crate::mask::LabelRaster;
use crate::models::{Region, RegionFile};
use chrono::NaiveDateTime;
use tracing::{debug, warn};

/// Cell-centre coordinates: one row per ping time, one column per depth
#[derive(Debug, Clone, PartialEq)]
pub struct MaskGrid {
    pub times: Vec<NaiveDateTime>,
    pub depths: Vec<f64>,
}

impl MaskGrid {
    pub fn new(times: Vec<NaiveDateTime>, depths: Vec<f64>) -> Self {
        Self { times, depths }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.times.len(), self.depths.len())
    }
}

/// Label raster of the given regions over `grid`.
///
/// Without explicit `labels` each region is labelled with its id read as a
/// number. Where polygons overlap, the region listed later wins.
pub fn rasterize_regions(
    file: &RegionFile,
    region_ids: &[String],
    labels: Option<&[f64]>,
    grid: &MaskGrid,
) -> Result<LabelRaster> {
    if region_ids.is_empty() {
        return Err(EchoregionsError::invalid_value("region_ids must not be empty"));
    }
    if let Some(labels) = labels {
        if labels.len() != region_ids.len() {
            return Err(EchoregionsError::invalid_value(format!(
                "{} labels given for {} regions",
                labels.len(),
                region_ids.len()
            )));
        }
    }

    let (rows, cols) = grid.shape();
    let mut raster = LabelRaster::empty(rows, cols);
    let Some(&origin) = grid.times.first() else {
        return Ok(raster);
    };
    let row_offsets: Vec<f64> = grid
        .times
        .iter()
        .map(|t| seconds_between(origin, *t))
        .collect();

    let mut covered = 0usize;
    for (i, id) in region_ids.iter().enumerate() {
        let region = file
            .region(id)
            .ok_or_else(|| EchoregionsError::invalid_value(format!("unknown region id '{}'", id)))?;
        let label = match labels {
            Some(labels) => labels[i],
            None => id.parse::<f64>().map_err(|_| {
                EchoregionsError::invalid_value(format!(
                    "region id '{}' is not numeric; pass explicit labels",
                    id
                ))
            })?,
        };

        let polygon = polygon(region, origin)?;
        let mut region_cells = 0usize;
        for (row, &x) in row_offsets.iter().enumerate() {
            for (col, &y) in grid.depths.iter().enumerate() {
                if contains(&polygon, x, y) {
                    raster.set(row, col, label)?;
                    region_cells += 1;
                }
            }
        }
        debug!("Region {} covers {} cells", id, region_cells);
        covered += region_cells;
    }

    if covered == 0 {
        warn!("No gridpoint belongs to any region");
    }
    Ok(raster)
}

fn polygon(region: &Region, origin: NaiveDateTime) -> Result<Vec<(f64, f64)>> {
    region
        .points
        .iter()
        .map(|point| {
            let depth = point.depth.value().ok_or_else(|| {
                EchoregionsError::invalid_value(format!(
                    "region {} has range-edge depth {}; set depth bounds and convert range edges first",
                    region.id, point.depth
                ))
            })?;
            Ok((seconds_between(origin, point.time()?), depth))
        })
        .collect()
}

fn seconds_between(origin: NaiveDateTime, t: NaiveDateTime) -> f64 {
    let delta = t - origin;
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9
}

/// Even-odd point-in-polygon test
fn contains(polygon: &[(f64, f64)], x: f64, y: f64) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}
