//! Error types for gp-kernels.

use thiserror::Error;

/// Errors that can occur when constructing or evaluating kernels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KernelError {
    /// Mismatched dimensions between inputs
    #[error("dimension mismatch in {context}: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        context: String,
    },

    /// Invalid kernel parameter, rejected at construction
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// The kernel is valid for `k`/`k_diag` but has no linear feature expansion
    #[error("feature map not implemented for kernel '{kernel}'")]
    NotImplemented { kernel: String },

    /// Kernel computation failed
    #[error("kernel computation error: {0}")]
    ComputationError(String),
}

impl KernelError {
    pub(crate) fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        KernelError::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for kernel operations
pub type Result<T> = std::result::Result<T, KernelError>;
