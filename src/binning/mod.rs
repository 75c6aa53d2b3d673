//! # Spatial Binning
//!
//! Turns raw spot coordinates into the logical "cells" that become matrix
//! rows. Two strategies exist, selected by [`BinType`]:
//!
//! - [`GridBinner`] (`bins`): quantizes coordinates onto a regular grid of
//!   `bin_size` units. The cell id is `"{bin_x}_{bin_y}"` and the cell center
//!   is the nominal grid center `bin * size + min + size / 2`, not the mean of
//!   the spots inside the bin.
//! - [`CellBoundaryBinner`] (`cell_bins`): groups spots by an externally
//!   supplied cell label, computes the convex hull of each group, and uses the
//!   hull's area-weighted centroid as the cell center.
//!
//! Both produce a [`BinAssignment`]: cells in first-occurrence order plus the
//! row each input point maps to.

mod cell;
mod error;
mod grid;


use std::fmt;
use std::str::FromStr;

use crate::geometry::Polygon;

pub use cell::CellBoundaryBinner;
pub use error::BinningError;
pub use grid::GridBinner;

/// Default grid bin size
pub const DEFAULT_BIN_SIZE: u32 = 100;

/// Binning strategy of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinType {
    /// Regular grid merging (`bins`)
    Bins,
    /// Cell boundaries from a label column (`cell_bins`)
    CellBins,
}

impl BinType {
    /// On-disk and command-line spelling.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BinType::Bins => "bins",
            BinType::CellBins => "cell_bins",
        }
    }

    /// Validate an optional bin type string. `None` (unset) is accepted.
    pub fn check(value: Option<&str>) -> Result<Option<Self>, BinningError> {
        value.map(str::parse).transpose()
    }
}

impl fmt::Display for BinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BinType {
    type Err = BinningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bins" => Ok(BinType::Bins),
            "cell_bins" => Ok(BinType::CellBins),
            other => Err(BinningError::InvalidBinType(other.to_string())),
        }
    }
}

/// One logical cell produced by a binner.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedCell {
    /// Cell identifier (grid id or the supplied label)
    pub id: String,
    /// Spatial center `[x, y]`
    pub center: [f64; 2],
    /// Convex hull, only for cell-boundary binning
    pub boundary: Option<Polygon>,
}

/// Result of binning a point set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinAssignment {
    /// Distinct cells in first-occurrence order
    pub cells: Vec<BinnedCell>,
    /// Index into `cells` for every input point
    pub point_cells: Vec<usize>,
}

impl BinAssignment {
    /// Number of distinct cells.
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// Cell identifiers in row order.
    pub fn cell_ids(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.id.clone()).collect()
    }

    /// Cell centers in row order.
    pub fn centers(&self) -> Vec<[f64; 2]> {
        self.cells.iter().map(|c| c.center).collect()
    }
}

/// A strategy assigning each raw point to a logical cell.
pub trait SpatialBinner {
    /// Strategy implemented by this binner.
    fn bin_type(&self) -> BinType;

    /// Bin the points `(xs[i], ys[i])`. `labels` carries the per-point cell
    /// label and is required by cell-boundary binning only.
    fn bin(
        &self,
        xs: &[i64],
        ys: &[i64],
        labels: Option<&[String]>,
    ) -> Result<BinAssignment, BinningError>;
}

/// Build the binner for a bin type. `bin_size` only matters for grid bins.
pub fn binner_for(bin_type: BinType, bin_size: u32) -> Result<Box<dyn SpatialBinner>, BinningError> {
    match bin_type {
        BinType::Bins => Ok(Box::new(GridBinner::new(bin_size)?)),
        BinType::CellBins => Ok(Box::new(CellBoundaryBinner::new())),
    }
}

pub(crate) fn check_lengths(xs: &[i64], ys: &[i64]) -> Result<(), BinningError> {
    if xs.len() != ys.len() {
        return Err(BinningError::LengthMismatch {
            x: xs.len(),
            y: ys.len(),
        });
    }
    Ok(())
}
