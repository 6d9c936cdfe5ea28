//! Rheo Core - immutable multichannel containers for signal analysis
//!
//! This crate provides the value types that flow through a rheo processing
//! graph, plus the numeric backend they compute with. Nothing here knows about
//! graphs or modules.
//!
//! # Containers
//!
//! - [`Signal`] - channels of `f64` samples with a sampling rate
//! - [`Spectrum`] - channels of [`Complex64`] bins with a frequency resolution
//! - [`Container`] - common surface for code that handles either
//!
//! Containers validate on construction, never change afterwards, and share
//! their channel storage between clones.
//!
//! # Arithmetic
//!
//! `+ - * /` work container-container (with single-channel broadcasting) and
//! container-scalar. Operators take references and return [`Result`]:
//!
//! ```
//! use rheo_core::{Error, Signal};
//!
//! let a = Signal::new([[1.0, 2.0]], 48_000.0, vec![]).unwrap();
//! let b = Signal::new([[4.0, 0.0]], 48_000.0, vec![]).unwrap();
//!
//! let sum = (&a + &b).unwrap();
//! assert_eq!(sum.channels()[0], vec![5.0, 2.0]);
//! assert_eq!(sum.labels()[0].as_deref(), Some("Sum 1"));
//!
//! assert_eq!(&a / &b, Err(Error::DivisionByZero));
//! ```
//!
//! # Numeric Backend
//!
//! Elementwise loops run through [`backend::Arithmetic`]. Select the
//! implementation once at startup with [`backend::install`].
//!
//! # Phase Analysis
//!
//! [`Spectrum::phase`], [`Spectrum::group_delay`] and
//! [`Spectrum::continuous_phase`] are built on the helpers in [`phase`].

pub mod backend;
pub mod container;
pub mod error;
pub mod phase;
pub mod signal;
pub mod spectrum;

pub use backend::{BackendKind, Op};
pub use container::{
    Container, DEFAULT_RESOLUTION, DEFAULT_SAMPLING_RATE, EMPTY_LENGTH, labels,
};
pub use error::{Error, Result};
pub use rustfft::num_complex::Complex64;
pub use signal::Signal;
pub use spectrum::Spectrum;
