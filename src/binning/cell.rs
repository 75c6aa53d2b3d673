use std::collections::HashMap;

use crate::geometry::{convex_hull, Point};

use super::{check_lengths, BinAssignment, BinType, BinnedCell, BinningError, SpatialBinner};

/// Binner grouping spots by a supplied cell label.
///
/// Each cell's shape is the convex hull of its spots and its center is the
/// hull centroid. Groups appear in the order their label is first seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellBoundaryBinner;

impl CellBoundaryBinner {
    /// Create a cell-boundary binner.
    pub fn new() -> Self {
        Self
    }
}

impl SpatialBinner for CellBoundaryBinner {
    fn bin_type(&self) -> BinType {
        BinType::CellBins
    }

    fn bin(
        &self,
        xs: &[i64],
        ys: &[i64],
        labels: Option<&[String]>,
    ) -> Result<BinAssignment, BinningError> {
        check_lengths(xs, ys)?;
        let labels = labels.ok_or(BinningError::MissingLabels)?;
        if labels.len() != xs.len() {
            return Err(BinningError::MissingLabels);
        }

        let mut order: Vec<&str> = Vec::new();
        let mut groups: Vec<Vec<Point>> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut point_cells = Vec::with_capacity(xs.len());

        for ((&x, &y), label) in xs.iter().zip(ys).zip(labels) {
            let row = *seen.entry(label.as_str()).or_insert_with(|| {
                order.push(label.as_str());
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[row].push(Point::new(x as f64, y as f64));
            point_cells.push(row);
        }

        let cells = order
            .into_iter()
            .zip(groups)
            .map(|(label, points)| {
                let hull = convex_hull(&points);
                // A group always holds at least one point, so the hull is non-empty.
                let center = hull.centroid().unwrap_or(points[0]);
                BinnedCell {
                    id: label.to_string(),
                    center: [center.x, center.y],
                    boundary: Some(hull),
                }
            })
            .collect();

        Ok(BinAssignment { cells, point_cells })
    }
}
