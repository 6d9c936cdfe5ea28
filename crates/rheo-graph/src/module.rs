//! The module interface.

use std::fmt;

use rheo_core::{Error, Result};

use crate::endpoint::EndpointDescriptor;
use crate::payload::Payload;

/// Identifier of one entry behind a [`MultiInput`](crate::EndpointKind::MultiInput)
/// endpoint.
///
/// Minted by the module; opaque to the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InputId(u64);

impl InputId {
    /// Wraps a raw identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric identifier.
    #[inline]
    pub fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputId({})", self.0)
    }
}

/// A processing module whose endpoints can be wired into a [`Graph`](crate::Graph).
///
/// Endpoints are addressed by their index in [`endpoints()`](Module::endpoints).
/// The graph only calls a method for endpoints of the matching kind and
/// payload, so implementations may treat other indices as unreachable, but the
/// default bodies return [`Error::Reference`] rather than panic.
///
/// Implementations hold their own state and compute outputs on demand; caching
/// and propagation are the graph's job.
pub trait Module {
    /// Static endpoint table.
    fn endpoints(&self) -> &'static [EndpointDescriptor];

    /// Name used in log output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Stores `value` on an [`Input`](crate::EndpointKind::Input) endpoint.
    fn set_input(&mut self, index: usize, value: Payload) -> Result<()> {
        let _ = value;
        Err(unsupported(index, "set_input"))
    }

    /// Adds an entry on a [`MultiInput`](crate::EndpointKind::MultiInput) endpoint.
    fn add_input(&mut self, index: usize, value: Payload) -> Result<InputId> {
        let _ = value;
        Err(unsupported(index, "add_input"))
    }

    /// Replaces an existing entry in place.
    fn replace_input(&mut self, index: usize, id: InputId, value: Payload) -> Result<()> {
        let _ = (id, value);
        Err(unsupported(index, "replace_input"))
    }

    /// Removes an entry.
    fn remove_input(&mut self, index: usize, id: InputId) -> Result<()> {
        let _ = id;
        Err(unsupported(index, "remove_input"))
    }

    /// Runs a [`Trigger`](crate::EndpointKind::Trigger) endpoint.
    fn trigger(&mut self, index: usize) -> Result<()> {
        Err(unsupported(index, "trigger"))
    }

    /// Computes an [`Output`](crate::EndpointKind::Output) endpoint.
    fn output(&self, index: usize) -> Result<Payload>;
}

fn unsupported(index: usize, operation: &str) -> Error {
    Error::reference(format!("endpoint {index} does not support {operation}"))
}
