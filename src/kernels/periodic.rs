//! Periodic kernel over a sine-warped distance.

use std::any::Any;
use std::f64::consts::PI;

use crate::error::{KernelError, Result};
use crate::kernel::PrimitiveKernel;
use crate::param::{Param, ParamValue};
use crate::slicing::ActiveDims;

/// Periodic kernel:
/// `K(x, y) = variance * exp(-0.5 * sum_d sin^2(pi (x_d - y_d) / period_d) / lengthscale_d^2)`.
///
/// Both `period` and `lengthscales` broadcast a scalar over all active
/// dimensions or carry one value per dimension. No feature map.
#[derive(Debug, Clone)]
pub struct Periodic {
    input_dim: usize,
    variance: Param,
    lengthscales: Param,
    period: Param,
    active_dims: ActiveDims,
    name: Option<String>,
}

impl Periodic {
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
            variance: Param::positive("variance", 1.0, false, 1)?,
            lengthscales: Param::positive("lengthscales", 1.0, false, input_dim)?,
            period: Param::positive("period", 1.0, false, input_dim)?,
            active_dims: ActiveDims::All,
            name: None,
        })
    }

    pub fn with_variance(mut self, v: f64) -> Result<Self> {
        self.variance.assign(v)?;
        Ok(self)
    }

    pub fn with_lengthscales(mut self, v: impl Into<ParamValue>) -> Result<Self> {
        self.lengthscales = Param::positive("lengthscales", v, false, self.input_dim)?;
        Ok(self)
    }

    pub fn with_period(mut self, v: impl Into<ParamValue>) -> Result<Self> {
        self.period = Param::positive("period", v, false, self.input_dim)?;
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

    pub fn period(&self) -> &Param {
        &self.period
    }
}

impl PrimitiveKernel for Periodic {
    fn base_name(&self) -> &'static str {
        "periodic"
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
        let warped: f64 = x
            .iter()
            .zip(y.iter())
            .enumerate()
            .map(|(d, (xi, yi))| {
                let s = (PI * (xi - yi) / self.period.value_at(d)).sin();
                let l = self.lengthscales.value_at(d);
                (s * s) / (l * l)
            })
            .sum();
        Ok(self.variance.scalar_value() * (-0.5 * warped).exp())
    }

    fn eval_diag(&self, _x: &[f64]) -> Result<f64> {
        Ok(self.variance.scalar_value())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
