//! Active-dimension slicing.
//!
//! Every kernel owns an [`ActiveDims`] specification restricting it to a
//! subset of input columns. Slicing is applied at the kernel boundary, so a
//! child inside a combination slices its own columns from the original,
//! unsliced parent input, independent of its siblings.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{KernelError, Result};

/// Which input columns a kernel operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActiveDims {
    /// Use every column of the input.
    All,
    /// An explicit ordered set of column indices.
    Indices(Vec<usize>),
    /// A contiguous half-open range of columns.
    Range(usize, usize),
}

impl ActiveDims {
    /// Number of columns the slice produces, if fixed by the specification.
    pub fn width(&self) -> Option<usize> {
        match self {
            ActiveDims::All => None,
            ActiveDims::Indices(idx) => Some(idx.len()),
            ActiveDims::Range(start, end) => Some(end.saturating_sub(*start)),
        }
    }

    /// Slice one input row down to the active columns.
    pub fn slice_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        match self {
            ActiveDims::All => Ok(row.to_vec()),
            ActiveDims::Indices(idx) => idx
                .iter()
                .map(|&i| {
                    row.get(i).copied().ok_or_else(|| KernelError::DimensionMismatch {
                        expected: vec![i + 1],
                        got: vec![row.len()],
                        context: "active_dims index".to_string(),
                    })
                })
                .collect(),
            ActiveDims::Range(start, end) => {
                if *end > row.len() || start > end {
                    return Err(KernelError::DimensionMismatch {
                        expected: vec![*end],
                        got: vec![row.len()],
                        context: "active_dims range".to_string(),
                    });
                }
                Ok(row[*start..*end].to_vec())
            }
        }
    }

    /// Slice an input batch column-wise.
    pub fn slice_batch(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        x.iter().map(|row| self.slice_row(row)).collect()
    }
}

impl Default for ActiveDims {
    fn default() -> Self {
        ActiveDims::All
    }
}

impl From<Vec<usize>> for ActiveDims {
    fn from(idx: Vec<usize>) -> Self {
        ActiveDims::Indices(idx)
    }
}

impl From<Range<usize>> for ActiveDims {
    fn from(r: Range<usize>) -> Self {
        ActiveDims::Range(r.start, r.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_passthrough() {
        let x = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let sliced = ActiveDims::All.slice_batch(&x).unwrap();
        assert_eq!(sliced, x);
    }

    #[test]
    fn test_index_slice() {
        let x = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let sliced = ActiveDims::Indices(vec![2, 0]).slice_batch(&x).unwrap();
        assert_eq!(sliced, vec![vec![3.0, 1.0], vec![6.0, 4.0]]);
    }

    #[test]
    fn test_range_slice() {
        let x = vec![vec![1.0, 2.0, 3.0, 4.0]];
        let sliced = ActiveDims::from(1..3).slice_batch(&x).unwrap();
        assert_eq!(sliced, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_out_of_bounds_index() {
        let x = vec![vec![1.0, 2.0]];
        assert!(ActiveDims::Indices(vec![0, 5]).slice_batch(&x).is_err());
        assert!(ActiveDims::Range(1, 4).slice_batch(&x).is_err());
    }

    #[test]
    fn test_width() {
        assert_eq!(ActiveDims::All.width(), None);
        assert_eq!(ActiveDims::Indices(vec![0, 3]).width(), Some(2));
        assert_eq!(ActiveDims::Range(1, 3).width(), Some(2));
    }
}
