use std::collections::HashMap;

use super::{check_lengths, BinAssignment, BinType, BinnedCell, BinningError, SpatialBinner};

/// Regular-grid binner merging spots into `bin_size` x `bin_size` squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBinner {
    bin_size: u32,
}

impl GridBinner {
    /// Create a grid binner. `bin_size` must be positive.
    pub fn new(bin_size: u32) -> Result<Self, BinningError> {
        if bin_size == 0 {
            return Err(BinningError::InvalidBinSize(bin_size));
        }
        Ok(Self { bin_size })
    }

    /// Edge length of a grid square.
    pub fn bin_size(&self) -> u32 {
        self.bin_size
    }

    /// Grid index of a coordinate: `floor((coord - min) / size)`.
    pub fn bin_coord(&self, coord: i64, coord_min: i64) -> Result<i64, BinningError> {
        coord
            .checked_sub(coord_min)
            .map(|offset| offset.div_euclid(i64::from(self.bin_size)))
            .ok_or(BinningError::CoordinateOverflow {
                coord,
                min: coord_min,
            })
    }

    /// Nominal center of a grid index: `bin * size + min + floor(size / 2)`.
    pub fn bin_center(&self, bin: i64, coord_min: i64) -> Result<i64, BinningError> {
        let size = i64::from(self.bin_size);
        bin.checked_mul(size)
            .and_then(|v| v.checked_add(coord_min))
            .and_then(|v| v.checked_add(size / 2))
            .ok_or(BinningError::CoordinateOverflow {
                coord: bin,
                min: coord_min,
            })
    }
}

impl SpatialBinner for GridBinner {
    fn bin_type(&self) -> BinType {
        BinType::Bins
    }

    fn bin(
        &self,
        xs: &[i64],
        ys: &[i64],
        _labels: Option<&[String]>,
    ) -> Result<BinAssignment, BinningError> {
        check_lengths(xs, ys)?;

        let (Some(&x_min), Some(&y_min)) = (xs.iter().min(), ys.iter().min()) else {
            return Ok(BinAssignment::default());
        };

        let mut cells = Vec::new();
        let mut point_cells = Vec::with_capacity(xs.len());
        let mut seen: HashMap<(i64, i64), usize> = HashMap::new();

        for (&x, &y) in xs.iter().zip(ys) {
            let key = (self.bin_coord(x, x_min)?, self.bin_coord(y, y_min)?);
            let row = match seen.get(&key) {
                Some(&row) => row,
                None => {
                    cells.push(BinnedCell {
                        id: format!("{}_{}", key.0, key.1),
                        center: [
                            self.bin_center(key.0, x_min)? as f64,
                            self.bin_center(key.1, y_min)? as f64,
                        ],
                        boundary: None,
                    });
                    seen.insert(key, cells.len() - 1);
                    cells.len() - 1
                }
            };
            point_cells.push(row);
        }

        Ok(BinAssignment { cells, point_cells })
    }
}
