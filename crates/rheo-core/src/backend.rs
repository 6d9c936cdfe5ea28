//! Elementwise numeric backend for container arithmetic.
//!
//! Containers never loop over samples themselves: every add/subtract/multiply/
//! divide goes through an [`Arithmetic`] implementation. Two are provided:
//!
//! - [`ScalarBackend`]: one sample at a time, the reference implementation
//! - [`BlockBackend`]: fixed blocks of [`LANES`] independent samples, which the
//!   compiler turns into SIMD code on most targets
//!
//! Both evaluate exactly the same IEEE operation per sample, so results are
//! bit-identical; only throughput differs.
//!
//! The process-wide backend is chosen once with [`install()`] (typically from
//! configuration at startup) and read with [`active()`]. If nothing is
//! installed before the first arithmetic operation, [`BackendKind::Block`] is
//! used.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Number of samples processed per block by [`BlockBackend`].
pub const LANES: usize = 8;

/// A sample type the backend can combine elementwise.
pub trait Sample:
    Copy
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Additive identity.
    const ZERO: Self;

    /// Returns true for an exact zero (either sign).
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;
}

impl Sample for Complex64 {
    const ZERO: Self = Complex64::new(0.0, 0.0);
}

/// The four elementwise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// `a + b`
    #[default]
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
}

impl Op {
    /// Applies the operation to one pair of samples.
    #[inline]
    pub fn apply<T: Sample>(self, a: T, b: T) -> T {
        match self {
            Op::Add => a + b,
            Op::Subtract => a - b,
            Op::Multiply => a * b,
            Op::Divide => a / b,
        }
    }

    /// Label stem given to channels produced by a container-container operation.
    pub fn label(self) -> &'static str {
        match self {
            Op::Add => "Sum",
            Op::Subtract => "Difference",
            Op::Multiply => "Product",
            Op::Divide => "Quotient",
        }
    }

    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Subtract => "subtract",
            Op::Multiply => "multiply",
            Op::Divide => "divide",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Op::Add),
            "subtract" => Ok(Op::Subtract),
            "multiply" => Ok(Op::Multiply),
            "divide" => Ok(Op::Divide),
            other => Err(Error::validation(format!("unknown operation '{other}'"))),
        }
    }
}

/// Elementwise arithmetic over sample slices.
///
/// `combine` requires equal-length slices; callers validate lengths before
/// dispatching. Division by zero is not checked here; containers reject zero
/// divisors before calling in.
pub trait Arithmetic {
    /// `lhs[i] op rhs[i]` for every `i`.
    fn combine<T: Sample>(&self, op: Op, lhs: &[T], rhs: &[T]) -> Vec<T>;

    /// `lhs[i] op rhs` for every `i`.
    fn combine_scalar<T: Sample>(&self, op: Op, lhs: &[T], rhs: T) -> Vec<T>;

    /// `lhs op rhs[i]` for every `i`.
    fn scalar_combine<T: Sample>(&self, op: Op, lhs: T, rhs: &[T]) -> Vec<T>;
}

/// Reference backend: a plain per-sample loop.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBackend;

impl Arithmetic for ScalarBackend {
    fn combine<T: Sample>(&self, op: Op, lhs: &[T], rhs: &[T]) -> Vec<T> {
        debug_assert_eq!(lhs.len(), rhs.len(), "combine: length mismatch");
        lhs.iter()
            .zip(rhs)
            .map(|(&a, &b)| op.apply(a, b))
            .collect()
    }

    fn combine_scalar<T: Sample>(&self, op: Op, lhs: &[T], rhs: T) -> Vec<T> {
        lhs.iter().map(|&a| op.apply(a, rhs)).collect()
    }

    fn scalar_combine<T: Sample>(&self, op: Op, lhs: T, rhs: &[T]) -> Vec<T> {
        rhs.iter().map(|&b| op.apply(lhs, b)).collect()
    }
}

/// Block backend: processes [`LANES`] samples per iteration.
///
/// The operation is resolved once per call rather than per sample, and each
/// block is computed into a fixed-size array so the loop body has no
/// data-dependent branches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockBackend;

impl BlockBackend {
    fn zip_blocks<T: Sample>(lhs: &[T], rhs: &[T], f: impl Fn(T, T) -> T) -> Vec<T> {
        debug_assert_eq!(lhs.len(), rhs.len(), "combine: length mismatch");
        let mut out = Vec::with_capacity(lhs.len());
        let mut left = lhs.chunks_exact(LANES);
        let mut right = rhs.chunks_exact(LANES);
        for (a, b) in (&mut left).zip(&mut right) {
            let block: [T; LANES] = std::array::from_fn(|i| f(a[i], b[i]));
            out.extend_from_slice(&block);
        }
        out.extend(
            left.remainder()
                .iter()
                .zip(right.remainder())
                .map(|(&a, &b)| f(a, b)),
        );
        out
    }

    fn map_blocks<T: Sample>(input: &[T], f: impl Fn(T) -> T) -> Vec<T> {
        let mut out = Vec::with_capacity(input.len());
        let mut chunks = input.chunks_exact(LANES);
        for a in &mut chunks {
            let block: [T; LANES] = std::array::from_fn(|i| f(a[i]));
            out.extend_from_slice(&block);
        }
        out.extend(chunks.remainder().iter().map(|&a| f(a)));
        out
    }
}

impl Arithmetic for BlockBackend {
    fn combine<T: Sample>(&self, op: Op, lhs: &[T], rhs: &[T]) -> Vec<T> {
        match op {
            Op::Add => Self::zip_blocks(lhs, rhs, |a, b| a + b),
            Op::Subtract => Self::zip_blocks(lhs, rhs, |a, b| a - b),
            Op::Multiply => Self::zip_blocks(lhs, rhs, |a, b| a * b),
            Op::Divide => Self::zip_blocks(lhs, rhs, |a, b| a / b),
        }
    }

    fn combine_scalar<T: Sample>(&self, op: Op, lhs: &[T], rhs: T) -> Vec<T> {
        match op {
            Op::Add => Self::map_blocks(lhs, |a| a + rhs),
            Op::Subtract => Self::map_blocks(lhs, |a| a - rhs),
            Op::Multiply => Self::map_blocks(lhs, |a| a * rhs),
            Op::Divide => Self::map_blocks(lhs, |a| a / rhs),
        }
    }

    fn scalar_combine<T: Sample>(&self, op: Op, lhs: T, rhs: &[T]) -> Vec<T> {
        match op {
            Op::Add => Self::map_blocks(rhs, |b| lhs + b),
            Op::Subtract => Self::map_blocks(rhs, |b| lhs - b),
            Op::Multiply => Self::map_blocks(rhs, |b| lhs * b),
            Op::Divide => Self::map_blocks(rhs, |b| lhs / b),
        }
    }
}

/// Selects one of the built-in backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// [`ScalarBackend`]
    Scalar,
    /// [`BlockBackend`]
    #[default]
    Block,
}

impl BackendKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Scalar => "scalar",
            BackendKind::Block => "block",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scalar" => Ok(BackendKind::Scalar),
            "block" => Ok(BackendKind::Block),
            other => Err(Error::validation(format!("unknown backend '{other}'"))),
        }
    }
}

impl Arithmetic for BackendKind {
    fn combine<T: Sample>(&self, op: Op, lhs: &[T], rhs: &[T]) -> Vec<T> {
        match self {
            BackendKind::Scalar => ScalarBackend.combine(op, lhs, rhs),
            BackendKind::Block => BlockBackend.combine(op, lhs, rhs),
        }
    }

    fn combine_scalar<T: Sample>(&self, op: Op, lhs: &[T], rhs: T) -> Vec<T> {
        match self {
            BackendKind::Scalar => ScalarBackend.combine_scalar(op, lhs, rhs),
            BackendKind::Block => BlockBackend.combine_scalar(op, lhs, rhs),
        }
    }

    fn scalar_combine<T: Sample>(&self, op: Op, lhs: T, rhs: &[T]) -> Vec<T> {
        match self {
            BackendKind::Scalar => ScalarBackend.scalar_combine(op, lhs, rhs),
            BackendKind::Block => BlockBackend.scalar_combine(op, lhs, rhs),
        }
    }
}

static ACTIVE: OnceLock<BackendKind> = OnceLock::new();

/// Installs the process-wide backend.
///
/// Succeeds if nothing was installed yet, or if `kind` is already the active
/// backend. Otherwise returns the backend that is already in use.
pub fn install(kind: BackendKind) -> Result<(), BackendKind> {
    match ACTIVE.set(kind) {
        Ok(()) => Ok(()),
        Err(_) => {
            let current = active();
            if current == kind { Ok(()) } else { Err(current) }
        }
    }
}

/// Returns the process-wide backend, defaulting to [`BackendKind::Block`].
pub fn active() -> BackendKind {
    *ACTIVE.get_or_init(BackendKind::default)
}
