//! Masked 2-D grids.
//!
//! A [`MaskedGrid`] pairs row-major `f32` values with a boolean mask. A `true`
//! mask entry marks a cell as invalid: it is excluded from statistics, from
//! transforms and from colour mapping.

use thiserror::Error;

/// Errors raised when constructing or slicing a grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Grid shape {width}x{height} needs {expected} values, got {actual}")]
    ShapeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Mask length {mask} does not match value length {values}")]
    MaskMismatch { values: usize, mask: usize },

    #[error("{axis} index {index} out of range for length {len}")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },
}

/// Row-major 2-D array of `f32` with a per-cell validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
    mask: Vec<bool>,
}

impl MaskedGrid {
    /// Build a grid from values and an explicit mask.
    pub fn new(
        width: usize,
        height: usize,
        values: Vec<f32>,
        mask: Vec<bool>,
    ) -> Result<Self, GridError> {
        let expected = width * height;
        if values.len() != expected {
            return Err(GridError::ShapeMismatch {
                width,
                height,
                expected,
                actual: values.len(),
            });
        }
        if mask.len() != values.len() {
            return Err(GridError::MaskMismatch {
                values: values.len(),
                mask: mask.len(),
            });
        }
        Ok(Self {
            width,
            height,
            values,
            mask,
        })
    }

    /// Build a grid masking every non-finite value.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Result<Self, GridError> {
        let mask = values.iter().map(|v| !v.is_finite()).collect();
        Self::new(width, height, values, mask)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(rows, cols)`, matching the numpy `shape` convention.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw values, including the ones under the mask.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Value at `(row, col)`, or `None` when masked or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let idx = row * self.width + col;
        if self.mask[idx] {
            None
        } else {
            Some(self.values[idx])
        }
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_none()
    }

    /// Number of unmasked cells.
    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|m| !**m).count()
    }

    /// Iterator over unmasked values.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.values
            .iter()
            .zip(&self.mask)
            .filter(|(_, masked)| !**masked)
            .map(|(v, _)| *v)
    }

    /// Mean over unmasked cells; `None` when everything is masked.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .valid_values()
            .fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// `(min, max)` over unmasked cells.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.valid_values().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    /// Select rows, then columns, by index. The mask travels with the values.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Result<Self, GridError> {
        check_indices("row", rows, self.height)?;
        check_indices("column", cols, self.width)?;

        let mut values = Vec::with_capacity(rows.len() * cols.len());
        let mut mask = Vec::with_capacity(rows.len() * cols.len());
        for &row in rows {
            let base = row * self.width;
            for &col in cols {
                values.push(self.values[base + col]);
                mask.push(self.mask[base + col]);
            }
        }

        Ok(Self {
            width: cols.len(),
            height: rows.len(),
            values,
            mask,
        })
    }

    /// Reverse the row order.
    pub fn flip_rows(&self) -> Self {
        let mut values = Vec::with_capacity(self.values.len());
        let mut mask = Vec::with_capacity(self.mask.len());
        for row in (0..self.height).rev() {
            let range = row * self.width..(row + 1) * self.width;
            values.extend_from_slice(&self.values[range.clone()]);
            mask.extend_from_slice(&self.mask[range]);
        }
        Self {
            width: self.width,
            height: self.height,
            values,
            mask,
        }
    }

    /// Mask every unmasked cell for which `predicate` holds.
    pub fn mask_where<F>(&self, predicate: F) -> Self
    where
        F: Fn(f32) -> bool,
    {
        let mask = self
            .values
            .iter()
            .zip(&self.mask)
            .map(|(&v, &m)| m || predicate(v))
            .collect();
        Self {
            width: self.width,
            height: self.height,
            values: self.values.clone(),
            mask,
        }
    }

    /// Apply `f` to unmasked cells. Masked cells keep their raw value.
    ///
    /// Results that are not finite are masked.
    pub fn map_valid<F>(&self, f: F) -> Self
    where
        F: Fn(f32) -> f32,
    {
        let mut values = Vec::with_capacity(self.values.len());
        let mut mask = Vec::with_capacity(self.mask.len());
        for (&v, &m) in self.values.iter().zip(&self.mask) {
            if m {
                values.push(v);
                mask.push(true);
            } else {
                let out = f(v);
                values.push(out);
                mask.push(!out.is_finite());
            }
        }
        Self {
            width: self.width,
            height: self.height,
            values,
            mask,
        }
    }
}

fn check_indices(axis: &'static str, indices: &[usize], len: usize) -> Result<(), GridError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(GridError::IndexOutOfRange { axis, index, len }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_masks_nan() {
        let grid = MaskedGrid::from_values(2, 1, vec![1.0, f32::NAN]).unwrap();
        assert_eq!(grid.valid_count(), 1);
        assert!(grid.is_masked(0, 1));
    }

    #[test]
    fn test_shape_mismatch() {
        let err = MaskedGrid::from_values(3, 3, vec![0.0; 8]).unwrap_err();
        assert_eq!(
            err,
            GridError::ShapeMismatch {
                width: 3,
                height: 3,
                expected: 9,
                actual: 8
            }
        );
    }

    #[test]
    fn test_flip_rows() {
        let grid = MaskedGrid::from_values(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let flipped = grid.flip_rows();
        assert_eq!(flipped.values(), &[3.0, 4.0, 1.0, 2.0]);
    }
}
