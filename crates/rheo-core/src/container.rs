//! Shared container machinery: validation, emptiness, broadcasting arithmetic.
//!
//! [`Signal`](crate::Signal) and [`Spectrum`](crate::Spectrum) are thin typed
//! wrappers around the private [`Frame`], which owns the channel storage and
//! implements every rule that does not depend on the sample type. The public
//! [`Container`] trait exposes the common surface to generic code such as the
//! merger.
//!
//! ## Arithmetic rules
//!
//! Container-container operations check, in order:
//!
//! 1. channel counts: a 1-channel operand broadcasts; two multi-channel
//!    operands must agree (empty operands included)
//! 2. sampling rate / resolution: must be exactly equal
//! 3. division: any zero sample in the divisor fails
//! 4. length: must match unless either operand is empty
//!
//! An empty operand is a placeholder. On the right it leaves the left operand
//! unchanged; on the left of `+` and `*` it yields the right operand, on the
//! left of `-` and `/` it stands for zero.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::backend::{self, Arithmetic, Op, Sample};
use crate::error::{Error, Result};

/// Sampling rate given to containers constructed without one, in Hz.
pub const DEFAULT_SAMPLING_RATE: f64 = 48_000.0;

/// Bin spacing given to spectra constructed without one, in Hz.
pub const DEFAULT_RESOLUTION: f64 = 1.0;

/// Length of an empty container.
pub const EMPTY_LENGTH: usize = 2;

/// Builds a label list from plain strings.
///
/// ```
/// let labels = rheo_core::labels(["left", "right"]);
/// assert_eq!(labels[1].as_deref(), Some("right"));
/// ```
pub fn labels<I, S>(iter: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    iter.into_iter().map(|s| Some(s.into())).collect()
}

/// Common surface of [`Signal`](crate::Signal) and [`Spectrum`](crate::Spectrum).
///
/// "Spacing" is the sampling rate of a signal or the resolution of a spectrum.
/// `Default` returns the canonical empty instance.
pub trait Container:
    Clone + PartialEq + fmt::Debug + fmt::Display + Default + Send + Sync + 'static
{
    /// Sample type of each channel.
    type Sample: Sample;

    /// Type name used in messages.
    const NAME: &'static str;

    /// Name of the spacing quantity used in messages.
    const SPACING_NAME: &'static str;

    /// Default spacing.
    const DEFAULT_SPACING: f64;

    /// Minimum channel length accepted by [`Container::from_parts`].
    const MIN_LENGTH: usize;

    /// Validating constructor; see the concrete types for the rules.
    fn from_parts(
        channels: Vec<Vec<Self::Sample>>,
        spacing: f64,
        labels: Vec<Option<String>>,
    ) -> Result<Self>;

    /// Channel data.
    fn channels(&self) -> &[Vec<Self::Sample>];

    /// Sampling rate or resolution.
    fn spacing(&self) -> f64;

    /// One entry per channel.
    fn labels(&self) -> &[Option<String>];

    /// Elementwise combination with another container of the same type.
    fn combine(&self, other: &Self, op: Op) -> Result<Self>;

    /// Copy with a different spacing.
    fn with_spacing(&self, spacing: f64) -> Result<Self> {
        Self::from_parts(self.channels().to_vec(), spacing, self.labels().to_vec())
    }

    /// Samples per channel.
    fn len(&self) -> usize {
        self.channels().first().map_or(0, Vec::len)
    }

    /// Number of channels.
    fn channel_count(&self) -> usize {
        self.channels().len()
    }

    /// True if the length is exactly two and every sample is zero.
    fn is_empty(&self) -> bool {
        self.len() == EMPTY_LENGTH
            && self
                .channels()
                .iter()
                .flatten()
                .all(|&s| s.is_zero())
    }
}

/// Typed channel storage behind both container types.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame<T> {
    channels: Arc<Vec<Vec<T>>>,
    spacing: f64,
    labels: Arc<Vec<Option<String>>>,
}

impl<T: Sample> Frame<T> {
    pub(crate) fn new(
        channels: Vec<Vec<T>>,
        spacing: f64,
        mut labels: Vec<Option<String>>,
        min_length: usize,
        spacing_name: &str,
    ) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(Error::validation("at least one channel is required"));
        };
        let length = first.len();
        if length < min_length {
            return Err(Error::validation(format!(
                "channels must hold at least {min_length} samples, got {length}"
            )));
        }
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != length)
        {
            return Err(Error::validation(format!(
                "channel {index} has length {}, expected {length}",
                channel.len()
            )));
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(Error::validation(format!(
                "{spacing_name} must be a positive number, got {spacing}"
            )));
        }
        labels.resize(channels.len(), None);
        Ok(Self {
            channels: Arc::new(channels),
            spacing,
            labels: Arc::new(labels),
        })
    }

    pub(crate) fn empty(spacing: f64) -> Self {
        Self {
            channels: Arc::new(vec![vec![T::ZERO; EMPTY_LENGTH]]),
            spacing,
            labels: Arc::new(vec![None]),
        }
    }

    fn unchecked(channels: Vec<Vec<T>>, spacing: f64, labels: Vec<Option<String>>) -> Self {
        Self {
            channels: Arc::new(channels),
            spacing,
            labels: Arc::new(labels),
        }
    }

    pub(crate) fn channels(&self) -> &[Vec<T>] {
        &self.channels
    }

    pub(crate) fn spacing(&self) -> f64 {
        self.spacing
    }

    pub(crate) fn labels(&self) -> &[Option<String>] {
        &self.labels
    }

    pub(crate) fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub(crate) fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == EMPTY_LENGTH && self.channels.iter().flatten().all(|&s| s.is_zero())
    }

    fn has_zero(&self) -> bool {
        self.channels.iter().flatten().any(|&s| s.is_zero())
    }

    /// Channel `index` of the broadcast view with `count` channels.
    fn broadcast(&self, index: usize) -> &[T] {
        if self.channels.len() == 1 {
            &self.channels[0]
        } else {
            &self.channels[index]
        }
    }

    pub(crate) fn combine(&self, other: &Self, op: Op, spacing_name: &str) -> Result<Self> {
        let (lhs_count, rhs_count) = (self.channel_count(), other.channel_count());
        if lhs_count > 1 && rhs_count > 1 && lhs_count != rhs_count {
            return Err(Error::incompatible(format!(
                "cannot broadcast {lhs_count} channels against {rhs_count}"
            )));
        }
        if self.spacing != other.spacing {
            return Err(Error::incompatible(format!(
                "{spacing_name} {} does not match {}",
                self.spacing, other.spacing
            )));
        }
        if op == Op::Divide && other.has_zero() {
            return Err(Error::DivisionByZero);
        }

        let count = lhs_count.max(rhs_count);
        let backend = backend::active();
        let channels: Vec<Vec<T>> = if other.is_empty() {
            (0..count).map(|i| self.broadcast(i).to_vec()).collect()
        } else if self.is_empty() {
            match op {
                Op::Add | Op::Multiply => (0..count).map(|i| other.broadcast(i).to_vec()).collect(),
                Op::Subtract | Op::Divide => (0..count)
                    .map(|i| backend.scalar_combine(op, T::ZERO, other.broadcast(i)))
                    .collect(),
            }
        } else {
            if self.len() != other.len() {
                return Err(Error::incompatible(format!(
                    "length {} does not match {}",
                    self.len(),
                    other.len()
                )));
            }
            (0..count)
                .map(|i| backend.combine(op, self.broadcast(i), other.broadcast(i)))
                .collect()
        };

        let labels = (1..=count)
            .map(|i| Some(format!("{} {i}", op.label())))
            .collect();
        Ok(Self::unchecked(channels, self.spacing, labels))
    }

    /// `self op scalar`, labels preserved.
    pub(crate) fn combine_scalar(&self, op: Op, scalar: T) -> Result<Self> {
        if op == Op::Divide && scalar.is_zero() {
            return Err(Error::DivisionByZero);
        }
        let backend = backend::active();
        let channels = self
            .channels
            .iter()
            .map(|c| backend.combine_scalar(op, c, scalar))
            .collect();
        Ok(Self::unchecked(channels, self.spacing, self.labels.to_vec()))
    }

    /// `scalar op self`, labels preserved.
    pub(crate) fn scalar_combine(&self, op: Op, scalar: T) -> Result<Self> {
        if op == Op::Divide && self.has_zero() {
            return Err(Error::DivisionByZero);
        }
        let backend = backend::active();
        let channels = self
            .channels
            .iter()
            .map(|c| backend.scalar_combine(op, scalar, c))
            .collect();
        Ok(Self::unchecked(channels, self.spacing, self.labels.to_vec()))
    }

    pub(crate) fn with_spacing(&self, spacing: f64, spacing_name: &str) -> Result<Self> {
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(Error::validation(format!(
                "{spacing_name} must be a positive number, got {spacing}"
            )));
        }
        Ok(Self {
            channels: Arc::clone(&self.channels),
            spacing,
            labels: Arc::clone(&self.labels),
        })
    }
}

/// Label entry as found in serialized input.
///
/// Anything that is neither a string nor null lands in `Other` and is
/// rejected during conversion.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawLabel {
    Text(Option<String>),
    Other(IgnoredAny),
}

pub(crate) fn check_labels(raw: Vec<RawLabel>) -> Result<Vec<Option<String>>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, label)| match label {
            RawLabel::Text(text) => Ok(text),
            RawLabel::Other(_) => Err(Error::validation(format!(
                "label {index} is not a string"
            ))),
        })
        .collect()
}

/// Implements the `std::ops` operators for a container type.
///
/// Every operator works on references and returns `Result<Container>`.
macro_rules! container_ops {
    ($ty:ty, $scalar:ty) => {
        impl std::ops::Add<$scalar> for &$ty {
            type Output = $crate::Result<$ty>;
            fn add(self, rhs: $scalar) -> Self::Output {
                self.add_scalar(rhs)
            }
        }

        impl std::ops::Sub<$scalar> for &$ty {
            type Output = $crate::Result<$ty>;
            fn sub(self, rhs: $scalar) -> Self::Output {
                self.sub_scalar(rhs)
            }
        }

        impl std::ops::Mul<$scalar> for &$ty {
            type Output = $crate::Result<$ty>;
            fn mul(self, rhs: $scalar) -> Self::Output {
                self.mul_scalar(rhs)
            }
        }

        impl std::ops::Div<$scalar> for &$ty {
            type Output = $crate::Result<$ty>;
            fn div(self, rhs: $scalar) -> Self::Output {
                self.div_scalar(rhs)
            }
        }

        impl std::ops::Add<&$ty> for $scalar {
            type Output = $crate::Result<$ty>;
            fn add(self, rhs: &$ty) -> Self::Output {
                rhs.add_scalar(self)
            }
        }

        impl std::ops::Sub<&$ty> for $scalar {
            type Output = $crate::Result<$ty>;
            fn sub(self, rhs: &$ty) -> Self::Output {
                rhs.scalar_sub(self)
            }
        }

        impl std::ops::Mul<&$ty> for $scalar {
            type Output = $crate::Result<$ty>;
            fn mul(self, rhs: &$ty) -> Self::Output {
                rhs.mul_scalar(self)
            }
        }

        impl std::ops::Div<&$ty> for $scalar {
            type Output = $crate::Result<$ty>;
            fn div(self, rhs: &$ty) -> Self::Output {
                rhs.scalar_div(self)
            }
        }
    };
    ($ty:ty) => {
        impl std::ops::Add for &$ty {
            type Output = $crate::Result<$ty>;
            fn add(self, rhs: Self) -> Self::Output {
                self.checked_add(rhs)
            }
        }

        impl std::ops::Sub for &$ty {
            type Output = $crate::Result<$ty>;
            fn sub(self, rhs: Self) -> Self::Output {
                self.checked_sub(rhs)
            }
        }

        impl std::ops::Mul for &$ty {
            type Output = $crate::Result<$ty>;
            fn mul(self, rhs: Self) -> Self::Output {
                self.checked_mul(rhs)
            }
        }

        impl std::ops::Div for &$ty {
            type Output = $crate::Result<$ty>;
            fn div(self, rhs: Self) -> Self::Output {
                self.checked_div(rhs)
            }
        }
    };
}

pub(crate) use container_ops;
