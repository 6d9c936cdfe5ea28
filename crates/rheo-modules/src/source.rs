//! Constant source feeding a container into a graph.

use rheo_core::{Container, Error, Result, Signal, Spectrum};
use rheo_graph::{EndpointDescriptor, Module, Payload, PayloadKind, PayloadType};

/// Holds one container and publishes it on its `value` output.
#[derive(Debug, Clone, Default)]
pub struct Source<C> {
    value: C,
}

/// Source of [`Signal`]s.
pub type SignalSource = Source<Signal>;

/// Source of [`Spectrum`]s.
pub type SpectrumSource = Source<Spectrum>;

impl<C: Container> Source<C> {
    /// Creates a source publishing `value`.
    pub fn new(value: C) -> Self {
        Self { value }
    }

    /// The published container.
    pub fn value(&self) -> &C {
        &self.value
    }

    /// Replaces the published container.
    pub fn set_value(&mut self, value: C) {
        self.value = value;
    }

    /// Re-stamps the published container with a new rate or resolution.
    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        self.value = self.value.with_spacing(rate)?;
        Ok(())
    }
}

/// Endpoint indices of [`Source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourcePort {
    /// Container input.
    SetValue,
    /// Float input; rate or resolution of the published container.
    SetRate,
    /// The published container.
    Value,
}

impl SourcePort {
    /// All ports, in endpoint-table order.
    pub const ALL: [SourcePort; 3] = [SourcePort::SetValue, SourcePort::SetRate, SourcePort::Value];
}

impl From<SourcePort> for usize {
    fn from(port: SourcePort) -> usize {
        port as usize
    }
}

impl<C: Container + PayloadType> Source<C> {
    const ENDPOINTS: &'static [EndpointDescriptor] = &[
        EndpointDescriptor::input("set_value", C::KIND).affecting(&["value"]),
        EndpointDescriptor::input("set_rate", PayloadKind::Float).affecting(&["value"]),
        EndpointDescriptor::output("value", C::KIND),
    ];
}

impl<C: Container + PayloadType> Module for Source<C> {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        Self::ENDPOINTS
    }

    fn name(&self) -> &'static str {
        "Source"
    }

    fn set_input(&mut self, index: usize, value: Payload) -> Result<()> {
        match SourcePort::ALL.get(index) {
            Some(SourcePort::SetValue) => {
                self.value = value.into_value()?;
                Ok(())
            }
            Some(SourcePort::SetRate) => self.set_rate(value.into_value()?),
            _ => Err(Error::reference(format!("source endpoint {index} is not an input"))),
        }
    }

    fn output(&self, index: usize) -> Result<Payload> {
        match SourcePort::ALL.get(index) {
            Some(SourcePort::Value) => Ok(self.value.clone().into()),
            _ => Err(Error::reference(format!("source endpoint {index} is not an output"))),
        }
    }
}
