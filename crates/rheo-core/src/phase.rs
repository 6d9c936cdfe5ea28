//! Phase helpers for spectra: wrapping, unwrapping, group delay.
//!
//! All functions operate on a single channel. Inputs are wrapped phase values
//! in radians, ordered by frequency bin.

use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

/// Angle of `z` in (−π, π].
///
/// `atan2` returns −π for a negative real part with a negative-zero imaginary
/// part; that value is folded onto π.
#[inline]
pub fn wrapped_angle(z: Complex64) -> f64 {
    let angle = z.im.atan2(z.re);
    if angle == -PI { PI } else { angle }
}

/// Removes 2π jumps from wrapped phase.
///
/// Each step between neighbouring bins of magnitude π or more is replaced by
/// its equivalent in [−π, π]; a step of exactly ±π keeps its sign. The first
/// bin is left as is.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let two_pi = 2.0 * PI;
    let mut correction = 0.0;
    let mut previous = None;
    phase
        .iter()
        .map(|&p| {
            if let Some(prev) = previous {
                let step: f64 = p - prev;
                if step.abs() >= PI {
                    let mut folded = (step + PI).rem_euclid(two_pi) - PI;
                    if folded == -PI && step > 0.0 {
                        folded = PI;
                    }
                    correction += folded - step;
                }
            }
            previous = Some(p);
            p + correction
        })
        .collect()
}

/// Group delay in seconds from wrapped phase with bin spacing `resolution` Hz.
///
/// `gd[k] = −(u[k] − u[k−1]) / (2π·resolution)` on the unwrapped phase `u`;
/// the first bin repeats the second. Needs at least two bins.
pub fn group_delay(phase: &[f64], resolution: f64) -> Vec<f64> {
    let unwrapped = unwrap_phase(phase);
    let scale = -1.0 / (2.0 * PI * resolution);
    let mut delay: Vec<f64> = Vec::with_capacity(unwrapped.len());
    delay.push(0.0);
    delay.extend(unwrapped.windows(2).map(|w| (w[1] - w[0]) * scale));
    if delay.len() > 1 {
        delay[0] = delay[1];
    }
    delay
}

/// Phase reconstructed by integrating `−2π·gd·resolution`, anchored at zero.
///
/// Unlike [`unwrap_phase`], the result does not depend on the absolute phase
/// of the first bin.
pub fn continuous_phase(group_delay: &[f64], resolution: f64) -> Vec<f64> {
    let step = -2.0 * PI * resolution;
    let mut phase = 0.0;
    group_delay
        .iter()
        .enumerate()
        .map(|(k, &gd)| {
            if k > 0 {
                phase += step * gd;
            }
            phase
        })
        .collect()
}
