//! Values carried along edges.

use rheo_core::{Error, Signal, Spectrum};

use crate::endpoint::PayloadKind;

/// A value delivered to or read from an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Time-domain container.
    Signal(Signal),
    /// Frequency-domain container.
    Spectrum(Spectrum),
    /// Real scalar.
    Float(f64),
    /// Integer scalar.
    Integer(i64),
    /// Boolean.
    Flag(bool),
    /// Text, including strategy and operation names.
    Text(String),
    /// Rows of plot data.
    Sequence(Vec<Vec<f64>>),
}

impl Payload {
    /// Kind of this value.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Signal(_) => PayloadKind::Signal,
            Payload::Spectrum(_) => PayloadKind::Spectrum,
            Payload::Float(_) => PayloadKind::Float,
            Payload::Integer(_) => PayloadKind::Integer,
            Payload::Flag(_) => PayloadKind::Flag,
            Payload::Text(_) => PayloadKind::Text,
            Payload::Sequence(_) => PayloadKind::Sequence,
        }
    }

    /// Converts into `T`, failing with [`Error::Validation`] on a kind mismatch.
    pub fn into_value<T: PayloadType>(self) -> Result<T, Error> {
        T::try_from(self)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_owned())
    }
}

/// Rust types with a [`Payload`] variant.
pub trait PayloadType: Into<Payload> + TryFrom<Payload, Error = Error> {
    /// Variant kind.
    const KIND: PayloadKind;
}

macro_rules! payload_type {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Payload {
            fn from(value: $ty) -> Self {
                Payload::$variant(value)
            }
        }

        impl TryFrom<Payload> for $ty {
            type Error = Error;

            fn try_from(payload: Payload) -> Result<Self, Error> {
                match payload {
                    Payload::$variant(value) => Ok(value),
                    other => Err(Error::validation(format!(
                        "expected {:?} payload, got {:?}",
                        PayloadKind::$variant,
                        other.kind()
                    ))),
                }
            }
        }

        impl PayloadType for $ty {
            const KIND: PayloadKind = PayloadKind::$variant;
        }
    };
}

payload_type!(Signal, Signal);
payload_type!(Spectrum, Spectrum);
payload_type!(f64, Float);
payload_type!(i64, Integer);
payload_type!(bool, Flag);
payload_type!(String, Text);
payload_type!(Vec<Vec<f64>>, Sequence);
