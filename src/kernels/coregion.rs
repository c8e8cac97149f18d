//! Coregionalization kernel over integer output indices.

use std::any::Any;

use crate::error::{KernelError, Result};
use crate::kernel::PrimitiveKernel;
use crate::param::Param;
use crate::slicing::ActiveDims;

/// Coregionalization kernel for multi-output models.
///
/// Inputs are a single column of integer-valued categories in
/// `0..output_dim`; the covariance between categories `i` and `j` is
/// `B[i][j]` where `B = W * W^T + diag(kappa)`. `W` is `output_dim x rank`
/// and unconstrained, `kappa` is positive. Rows whose category is not an
/// integer in range fail with a computation error.
#[derive(Debug, Clone)]
pub struct Coregion {
    output_dim: usize,
    rank: usize,
    w: Vec<Vec<f64>>,
    kappa: Param,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl Coregion {
    /// Create a coregion kernel with `W` all zeros and unit `kappa`, so the
    /// initial `B` is the identity.
    pub fn new(output_dim: usize, rank: usize) -> Result<Self> {
        if output_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "output_dim",
                0,
                "must be at least 1",
            ));
        }
        if rank == 0 {
            return Err(KernelError::invalid_parameter(
                "rank",
                0,
                "must be at least 1",
            ));
        }
        Ok(Self {
            output_dim,
            rank,
            w: vec![vec![0.0; rank]; output_dim],
            kappa: Param::positive("kappa", vec![1.0; output_dim], false, output_dim)?,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
        self.active_dims = dims.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn output_dim(&self) -> usize {
        self.output_dim
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn w(&self) -> &[Vec<f64>] {
        &self.w
    }

    pub fn kappa(&self) -> &Param {
        &self.kappa
    }

    /// Replace `W`; must be `output_dim x rank`. Entries are unconstrained.
    pub fn set_w(&mut self, w: Vec<Vec<f64>>) -> Result<()> {
        if w.len() != self.output_dim || w.iter().any(|row| row.len() != self.rank) {
            return Err(KernelError::DimensionMismatch {
                expected: vec![self.output_dim, self.rank],
                got: vec![w.len(), w.first().map_or(0, |row| row.len())],
                context: "coregion W".to_string(),
            });
        }
        self.w = w;
        Ok(())
    }

    /// Replace `kappa`; must have `output_dim` positive entries.
    pub fn set_kappa(&mut self, kappa: Vec<f64>) -> Result<()> {
        self.kappa.assign(kappa)
    }

    fn category(&self, row: &[f64]) -> Result<usize> {
        let raw = row[0];
        if !raw.is_finite() || raw.fract() != 0.0 || raw < 0.0 {
            return Err(KernelError::ComputationError(format!(
                "coregion input {} is not a category index",
                raw
            )));
        }
        let idx = raw as usize;
        if idx >= self.output_dim {
            return Err(KernelError::ComputationError(format!(
                "coregion category {} out of range for output_dim {}",
                idx, self.output_dim
            )));
        }
        Ok(idx)
    }

    /// Entry `B[i][j]` of `W * W^T + diag(kappa)`.
    fn b(&self, i: usize, j: usize) -> f64 {
        let low_rank: f64 = self.w[i]
            .iter()
            .zip(self.w[j].iter())
            .map(|(a, b)| a * b)
            .sum();
        if i == j {
            low_rank + self.kappa.value_at(i)
        } else {
            low_rank
        }
    }
}

impl PrimitiveKernel for Coregion {
    fn base_name(&self) -> &'static str {
        "coregion"
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.base_name())
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn active_dims(&self) -> &ActiveDims {
        &self.active_dims
    }

    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        let i = self.category(x)?;
        let j = self.category(y)?;
        Ok(self.b(i, j))
    }

    fn eval_diag(&self, x: &[f64]) -> Result<f64> {
        let i = self.category(x)?;
        Ok(self.b(i, i))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn example() -> Coregion {
        let mut k = Coregion::new(3, 2).unwrap();
        k.set_w(vec![vec![0.3, -0.4], vec![1.1, 0.2], vec![-0.5, 0.9]])
            .unwrap();
        k.set_kappa(vec![0.7, 1.3, 0.2]).unwrap();
        k
    }

    #[test]
    fn test_gram_matches_b_matrix() {
        let k = example();
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![1.0]];
        let gram = k.k(&x).unwrap();
        let cats = [0usize, 1, 2, 1];
        for (i, &ci) in cats.iter().enumerate() {
            for (j, &cj) in cats.iter().enumerate() {
                assert_relative_eq!(gram[i][j], k.b(ci, cj), max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_diag_consistency() {
        let k = example();
        let x = vec![vec![2.0], vec![0.0], vec![1.0]];
        let gram = k.k(&x).unwrap();
        let diag = k.k_diag(&x).unwrap();
        for i in 0..3 {
            assert_relative_eq!(gram[i][i], diag[i], max_relative = 1e-12);
        }
    }

    #[test]
    fn test_slicing_selects_category_column() {
        let k = example().with_active_dims(vec![1]);
        let padded = vec![vec![9.9, 0.0], vec![-3.0, 2.0]];
        let bare = vec![vec![0.0], vec![2.0]];
        assert_eq!(k.k(&padded).unwrap(), example().k(&bare).unwrap());
    }

    #[test]
    fn test_non_integer_category_rejected() {
        let k = example();
        assert!(k.k(&[vec![0.5]]).is_err());
        assert!(k.k(&[vec![-1.0]]).is_err());
        assert!(k.k(&[vec![3.0]]).is_err());
    }

    #[test]
    fn test_w_shape_validated() {
        let mut k = Coregion::new(3, 2).unwrap();
        assert!(k.set_w(vec![vec![0.0; 2]; 2]).is_err());
        assert!(k.set_w(vec![vec![0.0; 3]; 3]).is_err());
        assert!(k.set_kappa(vec![1.0, 2.0]).is_err());
        assert!(k.set_kappa(vec![1.0, -1.0, 2.0]).is_err());
    }
}
