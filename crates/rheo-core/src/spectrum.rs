//! Multichannel complex-valued frequency-domain container.

use std::fmt;

use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::backend::Op;
use crate::container::{self, Container, DEFAULT_RESOLUTION, Frame, RawLabel, container_ops};
use crate::error::{Error, Result};
use crate::phase;

/// Ordered channels of complex bins with a common frequency resolution.
///
/// Shares every construction and arithmetic rule with [`Signal`](crate::Signal),
/// except that channels need at least two bins. Scalars are [`Complex64`];
/// real scalars promote.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "SpectrumRepr", try_from = "SpectrumInput")]
pub struct Spectrum {
    frame: Frame<Complex64>,
}

impl Spectrum {
    /// Minimum number of bins per channel.
    pub const MIN_LENGTH: usize = 2;

    /// Validates and builds a spectrum.
    ///
    /// Fails with [`Error::Validation`] if there are no channels, a channel has
    /// fewer than two bins, channel lengths differ, or the resolution is not a
    /// positive finite number. Labels are padded or truncated.
    pub fn new<I, C>(channels: I, resolution: f64, labels: Vec<Option<String>>) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<Complex64>>,
    {
        let channels = channels.into_iter().map(Into::into).collect();
        Frame::new(
            channels,
            resolution,
            labels,
            Self::MIN_LENGTH,
            Self::SPACING_NAME,
        )
        .map(|frame| Self { frame })
    }

    /// The canonical empty spectrum: one channel of two zero bins at the
    /// default resolution.
    pub fn empty() -> Self {
        Self {
            frame: Frame::empty(DEFAULT_RESOLUTION),
        }
    }

    /// Channel data.
    pub fn channels(&self) -> &[Vec<Complex64>] {
        self.frame.channels()
    }

    /// Bin spacing in Hz.
    pub fn resolution(&self) -> f64 {
        self.frame.spacing()
    }

    /// One label per channel.
    pub fn labels(&self) -> &[Option<String>] {
        self.frame.labels()
    }

    /// Bins per channel.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.frame.channel_count()
    }

    /// True for any two-bin spectrum whose bins are all zero.
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Same channels and labels at a different resolution.
    pub fn with_resolution(&self, resolution: f64) -> Result<Self> {
        self.frame
            .with_spacing(resolution, Self::SPACING_NAME)
            .map(|frame| Self { frame })
    }

    /// Absolute value of every bin.
    pub fn magnitude(&self) -> Vec<Vec<f64>> {
        self.map_channels(|c| c.iter().map(|z| z.norm()).collect())
    }

    /// Wrapped angle of every bin, in (−π, π].
    pub fn phase(&self) -> Vec<Vec<f64>> {
        self.map_channels(|c| c.iter().map(|&z| phase::wrapped_angle(z)).collect())
    }

    /// Group delay in seconds per bin.
    ///
    /// Constant for a pure time delay.
    pub fn group_delay(&self) -> Vec<Vec<f64>> {
        let resolution = self.resolution();
        self.phase()
            .iter()
            .map(|p| phase::group_delay(p, resolution))
            .collect()
    }

    /// Phase rebuilt from the group delay, starting at zero for the first bin.
    pub fn continuous_phase(&self) -> Vec<Vec<f64>> {
        let resolution = self.resolution();
        self.group_delay()
            .iter()
            .map(|gd| phase::continuous_phase(gd, resolution))
            .collect()
    }

    fn map_channels(&self, f: impl Fn(&[Complex64]) -> Vec<f64>) -> Vec<Vec<f64>> {
        self.channels().iter().map(|c| f(c)).collect()
    }

    fn combine(&self, other: &Self, op: Op) -> Result<Self> {
        self.frame
            .combine(&other.frame, op, Self::SPACING_NAME)
            .map(|frame| Self { frame })
    }

    fn with_scalar(&self, op: Op, scalar: Complex64, reflected: bool) -> Result<Self> {
        let frame = if reflected {
            self.frame.scalar_combine(op, scalar)
        } else {
            self.frame.combine_scalar(op, scalar)
        };
        frame.map(|frame| Self { frame })
    }

    /// `self + other`
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

    /// `self / other`
    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        self.combine(other, Op::Divide)
    }

    /// `self + scalar`
    pub fn add_scalar(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Add, scalar.into(), false)
    }

    /// `self - scalar`
    pub fn sub_scalar(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Subtract, scalar.into(), false)
    }

    /// `self * scalar`
    pub fn mul_scalar(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Multiply, scalar.into(), false)
    }

    /// `self / scalar`
    pub fn div_scalar(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Divide, scalar.into(), false)
    }

    /// `scalar - self`
    pub fn scalar_sub(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Subtract, scalar.into(), true)
    }

    /// `scalar / self`
    pub fn scalar_div(&self, scalar: impl Into<Complex64>) -> Result<Self> {
        self.with_scalar(Op::Divide, scalar.into(), true)
    }
}

impl Default for Spectrum {
    fn default() -> Self {
        Self::empty()
    }
}

impl Container for Spectrum {
    type Sample = Complex64;

    const NAME: &'static str = "Spectrum";
    const SPACING_NAME: &'static str = "resolution";
    const DEFAULT_SPACING: f64 = DEFAULT_RESOLUTION;
    const MIN_LENGTH: usize = Spectrum::MIN_LENGTH;

    fn from_parts(
        channels: Vec<Vec<Complex64>>,
        spacing: f64,
        labels: Vec<Option<String>>,
    ) -> Result<Self> {
        Self::new(channels, spacing, labels)
    }

    fn channels(&self) -> &[Vec<Complex64>] {
        self.frame.channels()
    }

    fn spacing(&self) -> f64 {
        self.frame.spacing()
    }

    fn labels(&self) -> &[Option<String>] {
        self.frame.labels()
    }

    fn combine(&self, other: &Self, op: Op) -> Result<Self> {
        Spectrum::combine(self, other, op)
    }

    fn with_spacing(&self, spacing: f64) -> Result<Self> {
        self.with_resolution(spacing)
    }
}

container_ops!(Spectrum);
container_ops!(Spectrum, Complex64);
container_ops!(Spectrum, f64);

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Spectrum(length: {}, resolution: {:.2}, channel count: {})",
            self.len(),
            self.resolution(),
            self.channel_count()
        )
    }
}

impl fmt::Debug for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spectrum")
            .field("channels", &self.channels())
            .field("resolution", &self.resolution())
            .field("labels", &self.labels())
            .finish()
    }
}

/// Bins serialize as `[re, im]` pairs.
#[derive(Serialize)]
struct SpectrumRepr {
    channels: Vec<Vec<[f64; 2]>>,
    resolution: f64,
    labels: Vec<Option<String>>,
}

impl From<Spectrum> for SpectrumRepr {
    fn from(spectrum: Spectrum) -> Self {
        Self {
            channels: spectrum
                .channels()
                .iter()
                .map(|c| c.iter().map(|z| [z.re, z.im]).collect())
                .collect(),
            resolution: spectrum.resolution(),
            labels: spectrum.labels().to_vec(),
        }
    }
}

#[derive(Deserialize)]
struct SpectrumInput {
    channels: Vec<Vec<[f64; 2]>>,
    #[serde(default = "default_resolution")]
    resolution: f64,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}

impl TryFrom<SpectrumInput> for Spectrum {
    type Error = Error;

    fn try_from(input: SpectrumInput) -> Result<Self> {
        let labels = container::check_labels(input.labels)?;
        let channels: Vec<Vec<Complex64>> = input
            .channels
            .into_iter()
            .map(|c| c.into_iter().map(|[re, im]| Complex64::new(re, im)).collect())
            .collect();
        Spectrum::new(channels, input.resolution, labels)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;
    use crate::labels;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn spectrum(channels: Vec<Vec<Complex64>>) -> Spectrum {
        Spectrum::new(channels, 1.0, vec![]).unwrap()
    }

    #[test]
    fn requires_two_bins() {
        let result = Spectrum::new([vec![c(1.0, 0.0)]], 1.0, vec![]);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn empty_equals_explicit_zeros() {
        let explicit = spectrum(vec![vec![c(0.0, 0.0); 2]]);
        assert_eq!(Spectrum::empty(), explicit);
    }

    #[test]
    fn magnitude_and_phase() {
        let s = spectrum(vec![vec![c(3.0, 4.0), c(-1.0, 0.0), c(0.0, -2.0)]]);
        assert_eq!(s.magnitude()[0], vec![5.0, 1.0, 2.0]);
        let phase = &s.phase()[0];
        assert!((phase[0] - 4.0f64.atan2(3.0)).abs() < 1e-12);
        assert_eq!(phase[1], PI);
        assert_eq!(phase[2], -PI / 2.0);
    }

    #[test]
    fn complex_arithmetic_with_real_promotion() {
        let s = spectrum(vec![vec![c(1.0, 1.0), c(2.0, -1.0)]]);
        let doubled = (&s * 2.0).unwrap();
        assert_eq!(doubled.channels()[0], vec![c(2.0, 2.0), c(4.0, -2.0)]);
        let rotated = (&s * c(0.0, 1.0)).unwrap();
        assert_eq!(rotated.channels()[0], vec![c(-1.0, 1.0), c(1.0, 2.0)]);
        let difference = (c(0.0, 0.0) - &s).unwrap();
        assert_eq!(difference.channels()[0], vec![c(-1.0, -1.0), c(-2.0, 1.0)]);
    }

    #[test]
    fn empty_with_mismatched_channels() {
        let two = spectrum(vec![vec![c(1.0, 0.0); 4]; 2]);
        let empty_two = spectrum(vec![vec![c(0.0, 0.0); 2]; 2]);
        let empty_three = spectrum(vec![vec![c(0.0, 0.0); 2]; 3]);
        let sum = (&two + &empty_two).unwrap();
        assert_eq!(sum.channels(), two.channels());
        assert_eq!(sum.labels(), &labels(["Sum 1", "Sum 2"])[..]);
        assert!(matches!(&two + &empty_three, Err(Error::Incompatible(_))));
    }

    #[test]
    fn scalar_over_empty_divides_by_zero() {
        assert_eq!(1.0 / &Spectrum::empty(), Err(Error::DivisionByZero));
        assert_eq!(&Spectrum::empty() / c(0.0, 0.0), Err(Error::DivisionByZero));
    }

    #[test]
    fn resolution_mismatch() {
        let a = Spectrum::new([vec![c(1.0, 0.0); 3]], 1.0, vec![]).unwrap();
        let b = Spectrum::new([vec![c(1.0, 0.0); 3]], 2.0, vec![]).unwrap();
        assert!(matches!(&a - &b, Err(Error::Incompatible(_))));
    }

    #[test]
    fn display_summary() {
        let s = spectrum(vec![vec![c(0.0, 1.0); 5]]);
        assert_eq!(
            s.to_string(),
            "Spectrum(length: 5, resolution: 1.00, channel count: 1)"
        );
    }
}
