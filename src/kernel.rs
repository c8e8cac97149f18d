//! The kernel abstraction and its algebraic composition.
//!
//! Primitive kernels implement [`PrimitiveKernel`]: a pairwise covariance
//! function over already-sliced input rows plus matrix-level entry points
//! with default implementations. A [`Kernel`] is the public expression tree:
//! either a boxed primitive or a [`Combination`] of children under `Sum` or
//! `Prod`. Combining two combinations of the same operator flattens their
//! children into one list; child names are derived from kernel types and
//! deduplicated with numeric suffixes, and children are reachable by
//! generated name through [`Kernel::child`].

use std::any::Any;
use std::fmt;
use std::ops::{Add, Mul};

use log::trace;

use crate::error::{KernelError, Result};
use crate::slicing::ActiveDims;

/// A primitive covariance function.
///
/// Required methods cover identity (`base_name`, `input_dim`, `active_dims`)
/// and the pairwise form `eval`; the gram-matrix forms `k`, `k_cross` and
/// `k_diag` have default implementations that slice the raw input down to
/// the kernel's active dimensions and loop over row pairs. Kernels whose
/// one-argument and two-argument forms differ (White) or that admit a
/// linear feature expansion override the defaults.
pub trait PrimitiveKernel: Any + Send + Sync + fmt::Debug {
    /// Lower-cased type identifier used for child naming inside combinations.
    fn base_name(&self) -> &'static str;

    /// Name of this kernel instance: the explicit name given at
    /// construction, or [`PrimitiveKernel::base_name`].
    fn label(&self) -> &str {
        self.base_name()
    }

    /// Number of columns the kernel consumes after slicing.
    fn input_dim(&self) -> usize;

    fn active_dims(&self) -> &ActiveDims;

    /// Covariance of one pair of sliced input rows.
    fn eval(&self, x: &[f64], y: &[f64]) -> Result<f64>;

    /// Diagonal entry for one sliced input row, by the diagonal-only formula.
    fn eval_diag(&self, x: &[f64]) -> Result<f64> {
        self.eval(x, x)
    }

    /// Slice a raw input batch to the active columns and validate its width.
    fn slice_input(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let sliced = self.active_dims().slice_batch(x)?;
        if let Some(row) = sliced.iter().find(|row| row.len() != self.input_dim()) {
            return Err(KernelError::DimensionMismatch {
                expected: vec![self.input_dim()],
                got: vec![row.len()],
                context: format!("kernel '{}' input", self.label()),
            });
        }
        Ok(sliced)
    }

    /// Self-covariance matrix of `x`: square, symmetric.
    fn k(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let xs = self.slice_input(x)?;
        let n = xs.len();
        let mut gram = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let v = self.eval(&xs[i], &xs[j])?;
                gram[i][j] = v;
                gram[j][i] = v;
            }
        }
        Ok(gram)
    }

    /// Cross-covariance matrix between `x` (rows) and `x2` (columns).
    fn k_cross(&self, x: &[Vec<f64>], x2: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let xs = self.slice_input(x)?;
        let x2s = self.slice_input(x2)?;
        xs.iter()
            .map(|xi| x2s.iter().map(|xj| self.eval(xi, xj)).collect())
            .collect()
    }

    /// Diagonal of `k(x)`, without materializing the full matrix.
    fn k_diag(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let xs = self.slice_input(x)?;
        xs.iter().map(|xi| self.eval_diag(xi)).collect()
    }

    /// Explicit feature matrix whose row inner products reproduce (or
    /// approximate) `k`. Kernels without a linear expansion keep the
    /// default, which fails with [`KernelError::NotImplemented`].
    fn feature_map(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let _ = x;
        Err(KernelError::NotImplemented {
            kernel: self.label().to_string(),
        })
    }

    /// Finalize evaluation resources. Idempotent after the first call.
    fn compile(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release compiled resources.
    fn clear(&mut self) {}

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Combination operator of a kernel expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinationOp {
    Sum,
    Prod,
}

impl CombinationOp {
    fn label(self) -> &'static str {
        match self {
            CombinationOp::Sum => "sum",
            CombinationOp::Prod => "prod",
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            CombinationOp::Sum => a + b,
            CombinationOp::Prod => a * b,
        }
    }
}

/// A flattened combination node: an operator over two or more children,
/// each child owning its parameters and slicing its own active dimensions
/// from the original input.
#[derive(Debug)]
pub struct Combination {
    op: CombinationOp,
    children: Vec<Kernel>,
    names: Vec<String>,
}

impl Combination {
    fn new(op: CombinationOp, kernels: Vec<Kernel>) -> Self {
        let mut children = Vec::with_capacity(kernels.len());
        for kernel in kernels {
            match kernel {
                // Same-operator nesting flattens into one child list.
                Kernel::Combination(c) if c.op == op => children.extend(c.children),
                other => children.push(other),
            }
        }
        let names = assign_names(&children);
        trace!("built {} combination over {:?}", op.label(), names);
        Self {
            op,
            children,
            names,
        }
    }

    pub fn op(&self) -> CombinationOp {
        self.op
    }

    pub fn children(&self) -> &[Kernel] {
        &self.children
    }

    pub fn child_names(&self) -> &[String] {
        &self.names
    }
}

/// Generate unique child names from the children's own labels.
///
/// A label used by exactly one child stays bare; labels shared by several
/// children are suffixed `_1`, `_2`, ... in list order. Recomputed on every
/// combination construction, so merging trees re-suffixes a previously bare
/// name.
fn assign_names(children: &[Kernel]) -> Vec<String> {
    let labels: Vec<&str> = children.iter().map(|c| c.name()).collect();
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for label in &labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut seen: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    labels
        .iter()
        .map(|label| {
            if counts[label] == 1 {
                (*label).to_string()
            } else {
                let n = seen.entry(label).or_insert(0);
                *n += 1;
                format!("{}_{}", label, n)
            }
        })
        .collect()
}

/// A kernel expression: a primitive covariance function or a combination
/// of children under a sum or product operator.
#[derive(Debug)]
pub enum Kernel {
    Primitive(Box<dyn PrimitiveKernel>),
    Combination(Combination),
}

impl Kernel {
    /// Sum of the given kernels; same-operator children are flattened.
    pub fn sum(kernels: Vec<Kernel>) -> Result<Kernel> {
        Self::combine_checked(CombinationOp::Sum, kernels)
    }

    /// Product of the given kernels; same-operator children are flattened.
    pub fn product(kernels: Vec<Kernel>) -> Result<Kernel> {
        Self::combine_checked(CombinationOp::Prod, kernels)
    }

    fn combine_checked(op: CombinationOp, kernels: Vec<Kernel>) -> Result<Kernel> {
        if kernels.is_empty() {
            return Err(KernelError::invalid_parameter(
                "kernels",
                "[]",
                "a combination requires at least one child",
            ));
        }
        Ok(Self::combine(op, kernels))
    }

    fn combine(op: CombinationOp, kernels: Vec<Kernel>) -> Kernel {
        Kernel::Combination(Combination::new(op, kernels))
    }

    /// Name of this node: a primitive's label, or the operator name.
    pub fn name(&self) -> &str {
        match self {
            Kernel::Primitive(p) => p.label(),
            Kernel::Combination(c) => c.op.label(),
        }
    }

    /// Self-covariance matrix of `x`.
    pub fn k(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        match self {
            Kernel::Primitive(p) => p.k(x),
            Kernel::Combination(c) => {
                fold_matrices(c.op, c.children.iter().map(|child| child.k(x)))
            }
        }
    }

    /// Cross-covariance matrix between `x` and `x2`.
    pub fn k_cross(&self, x: &[Vec<f64>], x2: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        match self {
            Kernel::Primitive(p) => p.k_cross(x, x2),
            Kernel::Combination(c) => {
                fold_matrices(c.op, c.children.iter().map(|child| child.k_cross(x, x2)))
            }
        }
    }

    /// Diagonal of `k(x)` by the diagonal-only formulas.
    pub fn k_diag(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        match self {
            Kernel::Primitive(p) => p.k_diag(x),
            Kernel::Combination(c) => {
                fold_rows(c.op, c.children.iter().map(|child| child.k_diag(x)))
            }
        }
    }

    /// Explicit feature matrix for kernels that admit one. Combinations
    /// have no linear expansion and always fail.
    pub fn feature_map(&self, x: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        match self {
            Kernel::Primitive(p) => p.feature_map(x),
            Kernel::Combination(c) => Err(KernelError::NotImplemented {
                kernel: c.op.label().to_string(),
            }),
        }
    }

    /// Finalize evaluation resources, recursively. Idempotent.
    pub fn compile(&mut self) -> Result<()> {
        match self {
            Kernel::Primitive(p) => p.compile(),
            Kernel::Combination(c) => {
                for child in &mut c.children {
                    child.compile()?;
                }
                Ok(())
            }
        }
    }

    /// Release compiled resources, recursively.
    pub fn clear(&mut self) {
        match self {
            Kernel::Primitive(p) => p.clear(),
            Kernel::Combination(c) => {
                for child in &mut c.children {
                    child.clear();
                }
            }
        }
    }

    /// Look up a combination child by its generated name.
    pub fn child(&self, name: &str) -> Option<&Kernel> {
        match self {
            Kernel::Primitive(_) => None,
            Kernel::Combination(c) => c
                .names
                .iter()
                .position(|n| n == name)
                .map(|i| &c.children[i]),
        }
    }

    /// Mutable lookup of a combination child by its generated name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut Kernel> {
        match self {
            Kernel::Primitive(_) => None,
            Kernel::Combination(c) => c
                .names
                .iter()
                .position(|n| n == name)
                .map(|i| &mut c.children[i]),
        }
    }

    /// Generated names of the children, in construction order.
    pub fn child_names(&self) -> &[String] {
        match self {
            Kernel::Primitive(_) => &[],
            Kernel::Combination(c) => &c.names,
        }
    }

    /// View this node as a concrete primitive kernel type.
    pub fn downcast_ref<T: PrimitiveKernel>(&self) -> Option<&T> {
        match self {
            Kernel::Primitive(p) => p.as_any().downcast_ref::<T>(),
            Kernel::Combination(_) => None,
        }
    }

    /// Mutable view of this node as a concrete primitive kernel type.
    pub fn downcast_mut<T: PrimitiveKernel>(&mut self) -> Option<&mut T> {
        match self {
            Kernel::Primitive(p) => p.as_any_mut().downcast_mut::<T>(),
            Kernel::Combination(_) => None,
        }
    }
}

fn fold_matrices(
    op: CombinationOp,
    parts: impl Iterator<Item = Result<Vec<Vec<f64>>>>,
) -> Result<Vec<Vec<f64>>> {
    let mut acc: Option<Vec<Vec<f64>>> = None;
    for part in parts {
        let m = part?;
        acc = Some(match acc {
            None => m,
            Some(mut a) => {
                for (arow, mrow) in a.iter_mut().zip(m.iter()) {
                    for (av, &mv) in arow.iter_mut().zip(mrow.iter()) {
                        *av = op.apply(*av, mv);
                    }
                }
                a
            }
        });
    }
    acc.ok_or_else(|| KernelError::ComputationError("combination has no children".to_string()))
}

fn fold_rows(
    op: CombinationOp,
    parts: impl Iterator<Item = Result<Vec<f64>>>,
) -> Result<Vec<f64>> {
    let mut acc: Option<Vec<f64>> = None;
    for part in parts {
        let v = part?;
        acc = Some(match acc {
            None => v,
            Some(mut a) => {
                for (av, &vv) in a.iter_mut().zip(v.iter()) {
                    *av = op.apply(*av, vv);
                }
                a
            }
        });
    }
    acc.ok_or_else(|| KernelError::ComputationError("combination has no children".to_string()))
}

impl<R: Into<Kernel>> Add<R> for Kernel {
    type Output = Kernel;

    fn add(self, rhs: R) -> Kernel {
        Kernel::combine(CombinationOp::Sum, vec![self, rhs.into()])
    }
}

impl<R: Into<Kernel>> Mul<R> for Kernel {
    type Output = Kernel;

    fn mul(self, rhs: R) -> Kernel {
        Kernel::combine(CombinationOp::Prod, vec![self, rhs.into()])
    }
}

/// Wire a primitive kernel struct into the expression algebra: conversion
/// into [`Kernel`] plus `+` and `*` against anything else convertible.
macro_rules! impl_kernel_ops {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for $crate::kernel::Kernel {
            fn from(k: $ty) -> Self {
                $crate::kernel::Kernel::Primitive(Box::new(k))
            }
        }

        impl<R: Into<$crate::kernel::Kernel>> ::std::ops::Add<R> for $ty {
            type Output = $crate::kernel::Kernel;

            fn add(self, rhs: R) -> $crate::kernel::Kernel {
                $crate::kernel::Kernel::from(self) + rhs.into()
            }
        }

        impl<R: Into<$crate::kernel::Kernel>> ::std::ops::Mul<R> for $ty {
            type Output = $crate::kernel::Kernel;

            fn mul(self, rhs: R) -> $crate::kernel::Kernel {
                $crate::kernel::Kernel::from(self) * rhs.into()
            }
        }
    )*};
}

pub(crate) use impl_kernel_ops;
