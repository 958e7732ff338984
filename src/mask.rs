//! Conversion between 2D label rasters and one-hot mask stacks.
//!
//! A [`LabelRaster`] stores one `f64` label per cell, with NaN meaning
//! "no region". A [`OneHotMaskStack`] stores one boolean plane per label.
//!
//! Labels are ordered by first appearance in a row-major scan of the raster.
//! Two labels are the same when their bit patterns are equal, so `0.0` and
//! `-0.0` are distinct labels and no non-NaN value is ever folded into
//! another.

use crate::error::{EchoregionsError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Row-major grid of labels; NaN marks an unlabelled cell
#[derive(Debug, Clone)]
pub struct LabelRaster {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl LabelRaster {
    pub fn new(rows: usize, cols: usize, cells: Vec<f64>) -> Result<Self> {
        if cells.len() != rows * cols {
            return Err(EchoregionsError::invalid_value(format!(
                "raster of shape {}x{} needs {} cells, got {}",
                rows,
                cols,
                rows * cols,
                cells.len()
            )));
        }
        Ok(Self { rows, cols, cells })
    }

    /// All-unlabelled raster
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![f64::NAN; rows * cols],
        }
    }

    /// Build from nested rows; every row must have the same length
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != cols) {
            return Err(EchoregionsError::invalid_value(format!(
                "row {} has {} cells, expected {}",
                bad,
                rows[bad].len(),
                cols
            )));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.concat(),
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Label at a cell, `None` if unlabelled or out of bounds
    pub fn label(&self, row: usize, col: usize) -> Option<f64> {
        self.index(row, col)
            .map(|i| self.cells[i])
            .filter(|v| !v.is_nan())
    }

    pub fn set(&mut self, row: usize, col: usize, label: f64) -> Result<()> {
        let i = self.index(row, col).ok_or_else(|| {
            EchoregionsError::invalid_value(format!(
                "cell ({}, {}) outside raster of shape {}x{}",
                row, col, self.rows, self.cols
            ))
        })?;
        self.cells[i] = label;
        Ok(())
    }

    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Distinct labels in first-appearance order
    pub fn labels(&self) -> Vec<f64> {
        let mut seen = HashMap::new();
        let mut labels = Vec::new();
        for &value in self.cells.iter().filter(|v| !v.is_nan()) {
            seen.entry(value.to_bits()).or_insert_with(|| {
                labels.push(value);
            });
        }
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|v| v.is_nan())
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}

impl PartialEq for LabelRaster {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self
                .cells
                .iter()
                .zip(&other.cells)
                .all(|(a, b)| (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits())
    }
}

/// One boolean plane per label, all planes the shape of the source raster.
///
/// With no labels the stack holds a single all-false plane. Otherwise every
/// plane has at least one set cell and labels are ordered by their first set
/// cell in row-major order, the same shape `to_one_hot` produces.
#[derive(Debug, Clone, PartialEq)]
pub struct OneHotMaskStack {
    labels: Vec<f64>,
    rows: usize,
    cols: usize,
    planes: Vec<Vec<bool>>,
}

impl OneHotMaskStack {
    pub fn new(labels: Vec<f64>, rows: usize, cols: usize, planes: Vec<Vec<bool>>) -> Result<Self> {
        let mut seen = HashMap::with_capacity(labels.len());
        for &label in &labels {
            if label.is_nan() {
                return Err(EchoregionsError::invalid_value("mask label cannot be NaN"));
            }
            if seen.insert(label.to_bits(), ()).is_some() {
                return Err(EchoregionsError::invalid_value(format!(
                    "duplicate mask label {}",
                    label
                )));
            }
        }

        let expected_planes = labels.len().max(1);
        if planes.len() != expected_planes {
            return Err(EchoregionsError::invalid_value(format!(
                "{} labels need {} planes, got {}",
                labels.len(),
                expected_planes,
                planes.len()
            )));
        }
        if let Some(bad) = planes.iter().position(|p| p.len() != rows * cols) {
            return Err(EchoregionsError::invalid_value(format!(
                "plane {} has {} cells, expected {}",
                bad,
                planes[bad].len(),
                rows * cols
            )));
        }

        if !labels.is_empty() {
            let mut previous_first = 0;
            for (label, plane) in labels.iter().zip(&planes) {
                let first = plane.iter().position(|&set| set).ok_or_else(|| {
                    EchoregionsError::invalid_value(format!("label {} has no cells", label))
                })?;
                // Equal first cells mean overlap, which from_one_hot reports.
                if first < previous_first {
                    return Err(EchoregionsError::invalid_value(format!(
                        "label {} is not in first-appearance order",
                        label
                    )));
                }
                previous_first = first;
            }
        }

        Ok(Self {
            labels,
            rows,
            cols,
            planes,
        })
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn planes(&self) -> &[Vec<bool>] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> Option<&[bool]> {
        self.planes.get(index).map(Vec::as_slice)
    }

    /// Plane for a label, matched by bit pattern
    pub fn plane_for(&self, label: f64) -> Option<&[bool]> {
        self.labels
            .iter()
            .position(|l| l.to_bits() == label.to_bits())
            .and_then(|i| self.plane(i))
    }
}

/// Split a raster into one plane per distinct label
pub fn to_one_hot(raster: &LabelRaster) -> OneHotMaskStack {
    let (rows, cols) = raster.shape();
    let cell_count = rows * cols;
    let mut positions: HashMap<u64, usize> = HashMap::new();
    let mut labels = Vec::new();
    let mut planes: Vec<Vec<bool>> = Vec::new();

    for (cell, &value) in raster.cells().iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        let plane = *positions.entry(value.to_bits()).or_insert_with(|| {
            labels.push(value);
            planes.push(vec![false; cell_count]);
            planes.len() - 1
        });
        planes[plane][cell] = true;
    }

    if planes.is_empty() {
        planes.push(vec![false; cell_count]);
    }
    debug!(
        "One-hot stack of {} labels over {}x{} cells",
        labels.len(),
        rows,
        cols
    );

    OneHotMaskStack {
        labels,
        rows,
        cols,
        planes,
    }
}

/// Collapse a stack back into a raster; fails if any cell is claimed twice
pub fn from_one_hot(stack: &OneHotMaskStack) -> Result<LabelRaster> {
    let (rows, cols) = stack.shape();

    if stack.labels().is_empty() {
        if let Some(cell) = stack.planes.iter().flatten().position(|&b| b) {
            return Err(EchoregionsError::invalid_value(format!(
                "cell ({}, {}) is set in a stack with no labels",
                cell / cols.max(1),
                cell % cols.max(1)
            )));
        }
        return Ok(LabelRaster::empty(rows, cols));
    }

    let mut cells = vec![f64::NAN; rows * cols];
    let mut owner: Vec<Option<usize>> = vec![None; rows * cols];
    for (plane_index, plane) in stack.planes.iter().enumerate() {
        for (cell, _) in plane.iter().enumerate().filter(|(_, set)| **set) {
            if let Some(previous) = owner[cell] {
                return Err(EchoregionsError::invalid_value(format!(
                    "overlapping regions at cell ({}, {}): labels {} and {}",
                    cell / cols,
                    cell % cols,
                    stack.labels[previous],
                    stack.labels[plane_index]
                )));
            }
            owner[cell] = Some(plane_index);
            cells[cell] = stack.labels[plane_index];
        }
    }

    Ok(LabelRaster { rows, cols, cells })
}
