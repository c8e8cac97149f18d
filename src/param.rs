//! Kernel parameter storage.
//!
//! A [`Param`] is a named real-valued kernel parameter, either a scalar or a
//! per-dimension vector (the ARD form). Parameters are plain values: reading
//! goes through [`Param::read_value`], updates through [`Param::assign`], and
//! every update is visible on the next kernel evaluation. Constrained
//! transforms (e.g. softplus positivity reparameterization) are out of scope;
//! positivity is enforced once at construction and on each assignment.

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// A scalar-or-vector value used to initialize or update a [`Param`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Scalar(v)
    }
}

impl From<Vec<f64>> for ParamValue {
    fn from(v: Vec<f64>) -> Self {
        ParamValue::Vector(v)
    }
}

impl From<&[f64]> for ParamValue {
    fn from(v: &[f64]) -> Self {
        ParamValue::Vector(v.to_vec())
    }
}

/// A real-valued kernel parameter: scalar, or one value per active dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    name: String,
    values: Vec<f64>,
}

impl Param {
    /// Create a positive parameter, broadcasting a scalar to a length-`dim`
    /// vector when `ard` is set.
    ///
    /// A supplied vector must already have length `dim`; a scalar supplied
    /// under ARD becomes a uniform vector observably equal to the explicit
    /// one.
    pub fn positive(
        name: &str,
        value: impl Into<ParamValue>,
        ard: bool,
        dim: usize,
    ) -> Result<Self> {
        let values = match value.into() {
            ParamValue::Scalar(v) => {
                if ard {
                    vec![v; dim]
                } else {
                    vec![v]
                }
            }
            ParamValue::Vector(vs) => {
                if vs.len() != dim {
                    return Err(KernelError::DimensionMismatch {
                        expected: vec![dim],
                        got: vec![vs.len()],
                        context: format!("parameter '{}'", name),
                    });
                }
                vs
            }
        };
        for &v in &values {
            if v <= 0.0 || !v.is_finite() {
                return Err(KernelError::invalid_parameter(name, v, "must be positive"));
            }
        }
        Ok(Self {
            name: name.to_string(),
            values,
        })
    }

    /// Current numeric value: one element for a scalar, `dim` for ARD.
    pub fn read_value(&self) -> &[f64] {
        &self.values
    }

    /// Value applied to dimension `d`, broadcasting a scalar over all dims.
    pub fn value_at(&self, d: usize) -> f64 {
        if self.values.len() == 1 {
            self.values[0]
        } else {
            self.values[d]
        }
    }

    /// Scalar view of the parameter. For a vector parameter this is the
    /// first element; callers that require a true scalar should check
    /// [`Param::is_scalar`] first.
    pub fn scalar_value(&self) -> f64 {
        self.values[0]
    }

    pub fn is_scalar(&self) -> bool {
        self.values.len() == 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Re-assign the parameter. A scalar keeps the current shape by
    /// broadcasting over it; a vector must match the current length.
    pub fn assign(&mut self, value: impl Into<ParamValue>) -> Result<()> {
        match value.into() {
            ParamValue::Scalar(v) => {
                if v <= 0.0 || !v.is_finite() {
                    return Err(KernelError::invalid_parameter(
                        &self.name,
                        v,
                        "must be positive",
                    ));
                }
                for slot in &mut self.values {
                    *slot = v;
                }
            }
            ParamValue::Vector(vs) => {
                if vs.len() != self.values.len() {
                    return Err(KernelError::DimensionMismatch {
                        expected: vec![self.values.len()],
                        got: vec![vs.len()],
                        context: format!("parameter '{}'", self.name),
                    });
                }
                for &v in &vs {
                    if v <= 0.0 || !v.is_finite() {
                        return Err(KernelError::invalid_parameter(
                            &self.name,
                            v,
                            "must be positive",
                        ));
                    }
                }
                self.values = vs;
            }
        }
        Ok(())
    }
}
