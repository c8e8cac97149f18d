//! Arc-cosine kernel of Cho and Saul, orders 0, 1 and 2.

use std::any::Any;
use std::f64::consts::PI;

use crate::error::{KernelError, Result};
use crate::kernel::PrimitiveKernel;
use crate::param::{Param, ParamValue};
use crate::slicing::ActiveDims;

/// Orders with a closed-form angular dependency.
pub const IMPLEMENTED_ORDERS: [u32; 3] = [0, 1, 2];

/// Arc-cosine kernel:
/// `K(x, y) = variance / pi * J(theta) * |x|_w^order * |y|_w^order`,
/// where `|x|_w` is the norm under the weighted product
/// `bias_variance + sum_d weight_variances_d * x_d * y_d` and `theta` is the
/// angle between `x` and `y` in that inner product.
///
/// The cosine fed into `acos` is clamped to `[-1, 1]`, so coincident rows
/// land at `theta = 0` exactly instead of producing NaN from rounding.
#[derive(Debug, Clone)]
pub struct ArcCosine {
    input_dim: usize,
    order: u32,
    variance: Param,
    weight_variances: Param,
    bias_variance: Param,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl ArcCosine {
    /// Create an arc-cosine kernel of the given order. Orders outside
    /// [`IMPLEMENTED_ORDERS`] are rejected at construction.
    pub fn new(input_dim: usize, order: u32) -> Result<Self> {
        if input_dim == 0 {
            return Err(KernelError::invalid_parameter(
                "input_dim",
                0,
                "must be at least 1",
            ));
        }
        if !IMPLEMENTED_ORDERS.contains(&order) {
            return Err(KernelError::invalid_parameter(
                "order",
                order,
                "must be one of 0, 1, 2",
            ));
        }
        Ok(Self {
            input_dim,
            order,
            variance: Param::positive("variance", 1.0, false, 1)?,
            weight_variances: Param::positive("weight_variances", 1.0, false, input_dim)?,
            bias_variance: Param::positive("bias_variance", 1.0, false, 1)?,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    pub fn with_variance(mut self, v: f64) -> Result<Self> {
        self.variance.assign(v)?;
        Ok(self)
    }

    /// Set the weight variances: a vector switches to ARD with one weight
    /// per dimension.
    pub fn with_weight_variances(mut self, v: impl Into<ParamValue>) -> Result<Self> {
        let ard = !self.weight_variances.is_scalar();
        self.weight_variances = Param::positive("weight_variances", v, ard, self.input_dim)?;
        Ok(self)
    }

    /// Enable ARD, broadcasting a scalar weight variance per dimension.
    pub fn with_ard(mut self) -> Result<Self> {
        if self.weight_variances.is_scalar() {
            self.weight_variances = Param::positive(
                "weight_variances",
                self.weight_variances.scalar_value(),
                true,
                self.input_dim,
            )?;
        }
        Ok(self)
    }

    pub fn with_bias_variance(mut self, v: f64) -> Result<Self> {
        self.bias_variance.assign(v)?;
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

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn weight_variances(&self) -> &Param {
        &self.weight_variances
    }

    fn weighted_product(&self, x: &[f64], y: &[f64]) -> f64 {
        self.bias_variance.scalar_value()
            + x.iter()
                .zip(y.iter())
                .enumerate()
                .map(|(d, (xi, yi))| self.weight_variances.value_at(d) * xi * yi)
                .sum::<f64>()
    }

    /// Angular dependency `J(theta)` of the given order.
    fn j(&self, theta: f64) -> f64 {
        match self.order {
            0 => PI - theta,
            1 => theta.sin() + (PI - theta) * theta.cos(),
            _ => {
                let c = theta.cos();
                3.0 * theta.sin() * c + (PI - theta) * (1.0 + 2.0 * c * c)
            }
        }
    }
}

impl PrimitiveKernel for ArcCosine {
    fn base_name(&self) -> &'static str {
        "arccosine"
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
        let numerator = self.weighted_product(x, y);
        let x_norm = self.weighted_product(x, x).sqrt();
        let y_norm = self.weighted_product(y, y).sqrt();
        let cos_theta = (numerator / (x_norm * y_norm)).clamp(-1.0, 1.0);
        let theta = cos_theta.acos();
        let order = self.order as i32;
        Ok(self.variance.scalar_value() / PI
            * self.j(theta)
            * x_norm.powi(order)
            * y_norm.powi(order))
    }

    fn eval_diag(&self, x: &[f64]) -> Result<f64> {
        let product = self.weighted_product(x, x);
        Ok(self.variance.scalar_value() / PI * self.j(0.0) * product.powi(self.order as i32))
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
    fn test_unsupported_order_rejected() {
        let err = ArcCosine::new(1, 42).unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter { .. }));
    }

    #[test]
    fn test_order_zero_closed_form() {
        let k = ArcCosine::new(1, 0)
            .unwrap()
            .with_variance(1.3)
            .unwrap()
            .with_weight_variances(0.8)
            .unwrap()
            .with_bias_variance(0.4)
            .unwrap();
        let (x, y) = (0.7, -1.1);
        let wp = |a: f64, b: f64| 0.4 + 0.8 * a * b;
        let cos_theta = wp(x, y) / (wp(x, x).sqrt() * wp(y, y).sqrt());
        let theta = cos_theta.acos();
        let expected = 1.3 / PI * (PI - theta);
        assert_relative_eq!(k.eval(&[x], &[y]).unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_diag_matches_pairwise_on_coincident_rows() {
        for order in IMPLEMENTED_ORDERS {
            let k = ArcCosine::new(2, order).unwrap();
            let x = [1.3, -0.2];
            assert_relative_eq!(
                k.eval_diag(&x).unwrap(),
                k.eval(&x, &x).unwrap(),
                max_relative = 1e-9
            );
        }
    }

    #[test]
    fn test_finite_at_numerically_parallel_rows() {
        // cos_theta can drift above 1 by rounding; the clamp keeps acos
        // defined.
        for order in IMPLEMENTED_ORDERS {
            let k = ArcCosine::new(3, order).unwrap();
            let x = [1e-8, 1e-8, 1e-8];
            let v = k.eval(&x, &x).unwrap();
            assert!(v.is_finite());
        }
    }

    #[test]
    fn test_ard_broadcast_matches_explicit_vector() {
        let a = ArcCosine::new(3, 1)
            .unwrap()
            .with_ard()
            .unwrap()
            .with_weight_variances(1.23)
            .unwrap();
        let b = ArcCosine::new(3, 1)
            .unwrap()
            .with_weight_variances(vec![1.23; 3])
            .unwrap();
        assert_eq!(
            a.weight_variances().read_value(),
            b.weight_variances().read_value()
        );
        let (x, y) = ([0.1, 0.5, -0.3], [1.0, 0.0, 0.2]);
        assert_relative_eq!(
            a.eval(&x, &y).unwrap(),
            b.eval(&x, &y).unwrap(),
            max_relative = 1e-12
        );
    }
}
