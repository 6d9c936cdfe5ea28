//! Elementwise arithmetic between two containers.

use rheo_core::{Container, Error, Op, Result, Signal, Spectrum};
use rheo_graph::{EndpointDescriptor, Module, Payload, PayloadKind, PayloadType};

/// Combines two operand containers with one of the four [`Op`]s.
///
/// Both operands start out as the empty container and the operation as
/// [`Op::Add`]. Errors of the container arithmetic (incompatible operands,
/// division by zero) surface when `result` is read.
#[derive(Debug, Clone, Default)]
pub struct Algebra<C> {
    first: C,
    second: C,
    operation: Op,
}

/// Arithmetic on [`Signal`]s.
pub type SignalAlgebra = Algebra<Signal>;

/// Arithmetic on [`Spectrum`]s.
pub type SpectrumAlgebra = Algebra<Spectrum>;

impl<C: Container> Algebra<C> {
    /// Creates a module applying `operation` to two empty operands.
    pub fn new(operation: Op) -> Self {
        Self {
            first: C::default(),
            second: C::default(),
            operation,
        }
    }

    /// Left operand.
    pub fn set_first(&mut self, value: C) {
        self.first = value;
    }

    /// Right operand.
    pub fn set_second(&mut self, value: C) {
        self.second = value;
    }

    /// Current operation.
    pub fn operation(&self) -> Op {
        self.operation
    }

    /// Changes the operation.
    pub fn set_operation(&mut self, operation: Op) {
        self.operation = operation;
    }

    /// `first op second`.
    pub fn result(&self) -> Result<C> {
        self.first.combine(&self.second, self.operation)
    }
}

/// Endpoint indices of [`Algebra`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgebraPort {
    /// Left operand.
    SetFirst,
    /// Right operand.
    SetSecond,
    /// Text input naming the [`Op`].
    SetOperation,
    /// Combined container.
    Result,
}

impl AlgebraPort {
    /// All ports, in endpoint-table order.
    pub const ALL: [AlgebraPort; 4] = [
        AlgebraPort::SetFirst,
        AlgebraPort::SetSecond,
        AlgebraPort::SetOperation,
        AlgebraPort::Result,
    ];
}

impl From<AlgebraPort> for usize {
    fn from(port: AlgebraPort) -> usize {
        port as usize
    }
}

impl<C: Container + PayloadType> Algebra<C> {
    const ENDPOINTS: &'static [EndpointDescriptor] = &[
        EndpointDescriptor::input("set_first", C::KIND).affecting(&["result"]),
        EndpointDescriptor::input("set_second", C::KIND).affecting(&["result"]),
        EndpointDescriptor::input("set_operation", PayloadKind::Text).affecting(&["result"]),
        EndpointDescriptor::output("result", C::KIND),
    ];
}

impl<C: Container + PayloadType> Module for Algebra<C> {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        Self::ENDPOINTS
    }

    fn name(&self) -> &'static str {
        "Algebra"
    }

    fn set_input(&mut self, index: usize, value: Payload) -> Result<()> {
        match AlgebraPort::ALL.get(index) {
            Some(AlgebraPort::SetFirst) => self.first = value.into_value()?,
            Some(AlgebraPort::SetSecond) => self.second = value.into_value()?,
            Some(AlgebraPort::SetOperation) => {
                let name: String = value.into_value()?;
                self.operation = name.parse()?;
                tracing::debug!("algebra_operation: {}", self.operation.as_str());
            }
            _ => {
                return Err(Error::reference(format!(
                    "algebra endpoint {index} is not an input"
                )));
            }
        }
        Ok(())
    }

    fn output(&self, index: usize) -> Result<Payload> {
        match AlgebraPort::ALL.get(index) {
            Some(AlgebraPort::Result) => Ok(self.result()?.into()),
            _ => Err(Error::reference(format!(
                "algebra endpoint {index} is not an output"
            ))),
        }
    }
}
