//! Multichannel real-valued time-domain container.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::Op;
use crate::container::{
    self, Container, DEFAULT_SAMPLING_RATE, Frame, RawLabel, container_ops,
};
use crate::error::{Error, Result};

/// Ordered channels of `f64` samples at a common sampling rate.
///
/// Signals are immutable; every operation returns a new instance. Cloning is
/// cheap because channel storage is shared.
///
/// ```
/// use rheo_core::{Signal, labels};
///
/// let a = Signal::new([[1.0, 2.0, 3.0]], 48_000.0, labels(["a"])).unwrap();
/// let b = (&a * 2.0).unwrap();
/// assert_eq!(b.channels()[0], vec![2.0, 4.0, 6.0]);
/// assert_eq!(b.labels()[0].as_deref(), Some("a"));
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SignalRepr", try_from = "SignalInput")]
pub struct Signal {
    frame: Frame<f64>,
}

impl Signal {
    /// Minimum number of samples per channel.
    pub const MIN_LENGTH: usize = 1;

    /// Validates and builds a signal.
    ///
    /// Fails with [`Error::Validation`] if there are no channels, a channel is
    /// empty, channel lengths differ, or the rate is not a positive finite
    /// number. `labels` is padded with `None` or truncated to the channel
    /// count.
    pub fn new<I, C>(channels: I, sampling_rate: f64, labels: Vec<Option<String>>) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<f64>>,
    {
        let channels = channels.into_iter().map(Into::into).collect();
        Frame::new(
            channels,
            sampling_rate,
            labels,
            Self::MIN_LENGTH,
            Self::SPACING_NAME,
        )
        .map(|frame| Self { frame })
    }

    /// The canonical empty signal: one channel of two zeros at the default rate.
    pub fn empty() -> Self {
        Self {
            frame: Frame::empty(DEFAULT_SAMPLING_RATE),
        }
    }

    /// Channel data.
    pub fn channels(&self) -> &[Vec<f64>] {
        self.frame.channels()
    }

    /// Sampling rate in Hz.
    pub fn sampling_rate(&self) -> f64 {
        self.frame.spacing()
    }

    /// One label per channel.
    pub fn labels(&self) -> &[Option<String>] {
        self.frame.labels()
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.frame.channel_count()
    }

    /// True for any length-2 signal whose samples are all zero.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Same channels and labels at a different rate.
    pub fn with_sampling_rate(&self, sampling_rate: f64) -> Result<Self> {
        self.frame
            .with_spacing(sampling_rate, Self::SPACING_NAME)
            .map(|frame| Self { frame })
    }

    fn combine(&self, other: &Self, op: Op) -> Result<Self> {
        self.frame
            .combine(&other.frame, op, Self::SPACING_NAME)
            .map(|frame| Self { frame })
    }

    /// `self + other`, see the module docs of [`crate::container`] for the rules.
    pub fn checked_add(&self, other: &Self) -> Result<Self> {
        self.combine(other, Op::Add)
    }

    /// `self - other`
    pub fn checked_sub(&self, other: &Self) -> Result<Self> {
        self.combine(other, Op::Subtract)
    }

    /// `self * other`
    pub fn checked_mul(&self, other: &Self) -> Result<Self> {
        self.combine(other, Op::Multiply)
    }

    /// `self / other`; fails with [`Error::DivisionByZero`] if `other` holds a zero.
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        self.combine(other, Op::Divide)
    }

    /// `self + scalar`
    pub fn add_scalar(&self, scalar: f64) -> Result<Self> {
        self.frame
            .combine_scalar(Op::Add, scalar)
            .map(|frame| Self { frame })
    }

    /// `self - scalar`
    pub fn sub_scalar(&self, scalar: f64) -> Result<Self> {
        self.frame
            .combine_scalar(Op::Subtract, scalar)
            .map(|frame| Self { frame })
    }

    /// `self * scalar`
    pub fn mul_scalar(&self, scalar: f64) -> Result<Self> {
        self.frame
            .combine_scalar(Op::Multiply, scalar)
            .map(|frame| Self { frame })
    }

    /// `self / scalar`
    pub fn div_scalar(&self, scalar: f64) -> Result<Self> {
        self.frame
            .combine_scalar(Op::Divide, scalar)
            .map(|frame| Self { frame })
    }

    /// `scalar - self`
    pub fn scalar_sub(&self, scalar: f64) -> Result<Self> {
        self.frame
            .scalar_combine(Op::Subtract, scalar)
            .map(|frame| Self { frame })
    }

    /// `scalar / self`
    pub fn scalar_div(&self, scalar: f64) -> Result<Self> {
        self.frame
            .scalar_combine(Op::Divide, scalar)
            .map(|frame| Self { frame })
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::empty()
    }
}

impl Container for Signal {
    type Sample = f64;

    const NAME: &'static str = "Signal";
    const SPACING_NAME: &'static str = "sampling rate";
    const DEFAULT_SPACING: f64 = DEFAULT_SAMPLING_RATE;
    const MIN_LENGTH: usize = Signal::MIN_LENGTH;

    fn from_parts(
        channels: Vec<Vec<f64>>,
        spacing: f64,
        labels: Vec<Option<String>>,
    ) -> Result<Self> {
        Self::new(channels, spacing, labels)
    }

    fn channels(&self) -> &[Vec<f64>] {
        self.frame.channels()
    }

    fn spacing(&self) -> f64 {
        self.frame.spacing()
    }

    fn labels(&self) -> &[Option<String>] {
        self.frame.labels()
    }

    fn combine(&self, other: &Self, op: Op) -> Result<Self> {
        Signal::combine(self, other, op)
    }

    fn with_spacing(&self, spacing: f64) -> Result<Self> {
        self.with_sampling_rate(spacing)
    }
}

container_ops!(Signal);
container_ops!(Signal, f64);

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signal(length: {}, sampling rate: {:.2}, channel count: {})",
            self.len(),
            self.sampling_rate(),
            self.channel_count()
        )
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("channels", &self.channels())
            .field("sampling_rate", &self.sampling_rate())
            .field("labels", &self.labels())
            .finish()
    }
}

/// Serialized form; also the canonical reconstruction form.
#[derive(Serialize)]
struct SignalRepr {
    channels: Vec<Vec<f64>>,
    sampling_rate: f64,
    labels: Vec<Option<String>>,
}

impl From<Signal> for SignalRepr {
    fn from(signal: Signal) -> Self {
        Self {
            channels: signal.channels().to_vec(),
            sampling_rate: signal.sampling_rate(),
            labels: signal.labels().to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct SignalInput {
    channels: Vec<Vec<f64>>,
    #[serde(default = "default_sampling_rate")]
    sampling_rate: f64,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

fn default_sampling_rate() -> f64 {
    DEFAULT_SAMPLING_RATE
}

impl TryFrom<SignalInput> for Signal {
    type Error = Error;

    fn try_from(input: SignalInput) -> Result<Self> {
        let labels = container::check_labels(input.labels)?;
        Signal::new(input.channels, input.sampling_rate, labels)
    }
}
