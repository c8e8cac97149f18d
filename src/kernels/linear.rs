//! Dot-product kernels: Linear and its Polynomial generalization.

use std::any::Any;

use crate::error::{KernelError, Result};
use crate::kernel::PrimitiveKernel;
use crate::param::{Param, ParamValue};
use crate::slicing::ActiveDims;

fn weighted_dot(variance: &Param, x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .enumerate()
        .map(|(d, (xi, yi))| variance.value_at(d) * xi * yi)
        .sum()
}

/// Linear kernel: `K(x, y) = sum_d variance_d * x_d * y_d`.
///
/// The variance is scalar or per-dimension (ARD). This kernel admits an
/// exact feature map `phi(x)_d = sqrt(variance_d) * x_d`, so
/// `phi(x) . phi(y) = K(x, y)` up to rounding.
#[derive(Debug, Clone)]
pub struct Linear {
    input_dim: usize,
    variance: Param,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl Linear {
    pub fn new(input_dim: usize) -> Result<Self> {
        if input_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "input_dim",
                0,
                "must be at least 1",
            ));
        }
        Ok(Self {
            input_dim,
            variance: Param::positive("variance", 1.0, false, input_dim)?,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    /// Set the variance: a vector switches to ARD with one weight per
    /// dimension.
    pub fn with_variance(mut self, v: impl Into<ParamValue>) -> Result<Self> {
        let ard = !self.variance.is_scalar();
        self.variance = Param::positive("variance", v, ard, self.input_dim)?;
        Ok(self)
    }

    /// Enable ARD, broadcasting a scalar variance per dimension.
    pub fn with_ard(mut self) -> Result<Self> {
        if self.variance.is_scalar() {
            self.variance =
                Param::positive("variance", self.variance.scalar_value(), true, self.input_dim)?;
        }
        Ok(self)
    }

    pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
        self.active_dims = dims.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn variance(&self) -> &Param {
        &self.variance
    }

    pub fn set_variance(&mut self, v: impl Into<ParamValue>) -> Result<()> {
        self.variance.assign(v)
    }
}

impl PrimitiveKernel for Linear {
    fn base_name(&self) -> &'static str {
        "linear"
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.base_name())
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn active_dims(&self) -> &ActiveDims {
        &self.active_dims
    }

    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        Ok(weighted_dot(&self.variance, x, y))
    }

    fn feature_map(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let xs = self.slice_input(x)?;
        Ok(xs
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(d, xi)| self.variance.value_at(d).sqrt() * xi)
                    .collect()
            })
            .collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Polynomial kernel:
/// `K(x, y) = (sum_d variance_d * x_d * y_d + offset)^degree`.
///
/// `degree` is fixed at construction; `offset` must be positive. Unlike
/// [`Linear`] this kernel carries no feature map, its expansion dimension
/// grows combinatorially with the degree.
#[derive(Debug, Clone)]
pub struct Polynomial {
    input_dim: usize,
    variance: Param,
    offset: Param,
    degree: f64,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl Polynomial {
    /// Create a polynomial kernel of the given degree. The degree must be
    /// finite and at least 1.
    pub fn new(input_dim: usize, degree: f64) -> Result<Self> {
        if input_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "input_dim",
                0,
                "must be at least 1",
            ));
        }
        if !degree.is_finite() || degree < 1.0 {
            return Err(KernelError::invalid_parameter(
                "degree",
                degree,
                "must be at least 1",
            ));
        }
        Ok(Self {
            input_dim,
            variance: Param::positive("variance", 1.0, false, input_dim)?,
            offset: Param::positive("offset", 1.0, false, 1)?,
            degree,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    pub fn with_variance(mut self, v: impl Into<ParamValue>) -> Result<Self> {
        let ard = !self.variance.is_scalar();
        self.variance = Param::positive("variance", v, ard, self.input_dim)?;
        Ok(self)
    }

    pub fn with_offset(mut self, v: f64) -> Result<Self> {
        self.offset.assign(v)?;
        Ok(self)
    }

    pub fn with_active_dims(mut self, dims: impl Into<ActiveDims>) -> Self {
        self.active_dims = dims.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn degree(&self) -> f64 {
        self.degree
    }
}

impl PrimitiveKernel for Polynomial {
    fn base_name(&self) -> &'static str {
        "polynomial"
    }

    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.base_name())
    }

    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn active_dims(&self) -> &ActiveDims {
        &self.active_dims
    }

    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64> {
        let base = weighted_dot(&self.variance, x, y) + self.offset.scalar_value();
        Ok(base.powf(self.degree))
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

    #[test]
    fn test_linear_matches_dot_product() {
        let k = Linear::new(2)
            .unwrap()
            .with_variance(vec![0.5, 2.0])
            .unwrap();
        let v = k.eval(&[1.0, 3.0], &[-2.0, 0.5]).unwrap();
        assert_relative_eq!(v, 0.5 * 1.0 * -2.0 + 2.0 * 3.0 * 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_linear_feature_map_is_exact() {
        let k = Linear::new(2)
            .unwrap()
            .with_variance(vec![1.3, 0.2])
            .unwrap();
        let x = vec![vec![0.4, -1.0], vec![2.0, 0.1]];
        let phi = k.feature_map(&x).unwrap();
        let gram = k.k(&x).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let dot: f64 = phi[i].iter().zip(phi[j].iter()).map(|(a, b)| a * b).sum();
                assert_relative_eq!(dot, gram[i][j], max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_linear_ard_broadcast() {
        let a = Linear::new(3).unwrap().with_ard().unwrap().with_variance(1.7).unwrap();
        let b = Linear::new(3).unwrap().with_variance(vec![1.7; 3]).unwrap();
        assert_eq!(a.variance().read_value(), b.variance().read_value());
    }

    #[test]
    fn test_polynomial_matches_closed_form() {
        let k = Polynomial::new(1, 3.0)
            .unwrap()
            .with_variance(2.0)
            .unwrap()
            .with_offset(0.5)
            .unwrap();
        let v = k.eval(&[1.5], &[-0.4]).unwrap();
        assert_relative_eq!(v, (2.0 * 1.5 * -0.4 + 0.5_f64).powf(3.0), max_relative = 1e-12);
    }

    #[test]
    fn test_polynomial_has_no_feature_map() {
        let k = Polynomial::new(1, 2.0).unwrap();
        assert!(matches!(
            k.feature_map(&[vec![1.0]]),
            Err(KernelError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_polynomial_degree_validated() {
        assert!(Polynomial::new(1, 0.0).is_err());
        assert!(Polynomial::new(1, f64::NAN).is_err());
    }
}
