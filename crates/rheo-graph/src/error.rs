//! Graph error types.

use thiserror::Error;

use std::fmt;

use crate::endpoint::{EndpointKind, PayloadKind};
use crate::module::InputId;
use crate::node::{EdgeId, ModuleId, Port};

/// A mutation that took effect before propagation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The edge was registered and its initial value delivered.
    Connected(EdgeId),
    /// The edge was removed.
    Disconnected(EdgeId),
    /// The multi-input accepted a new entry.
    InputAdded(InputId),
    /// The endpoint accepted a value, a removal or a trigger.
    Changed(Port),
}

impl fmt::Display for Applied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected(id) => write!(f, "edge {id} connected"),
            Self::Disconnected(id) => write!(f, "edge {id} disconnected"),
            Self::InputAdded(id) => write!(f, "input {id} added"),
            Self::Changed(port) => write!(f, "{port} changed"),
        }
    }
}

/// Errors that can occur during graph operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The module was never added, or its owner dropped it.
    #[error("module {0} not found")]
    ModuleNotFound(ModuleId),

    /// No endpoint with this index or name.
    #[error("module {module} has no endpoint {endpoint}")]
    EndpointNotFound {
        /// Module searched.
        module: ModuleId,
        /// Requested index or name.
        endpoint: String,
    },

    /// The endpoint exists but cannot be used this way.
    #[error("endpoint {port} is {actual:?}, expected {expected}")]
    WrongEndpointKind {
        /// Offending endpoint.
        port: Port,
        /// Its declared kind.
        actual: EndpointKind,
        /// What the operation needs.
        expected: &'static str,
    },

    /// Payload kinds of the two sides disagree.
    #[error("endpoint {port} takes {expected:?}, got {found:?}")]
    TypeMismatch {
        /// Receiving endpoint.
        port: Port,
        /// Its declared payload kind.
        expected: PayloadKind,
        /// The offered kind.
        found: PayloadKind,
    },

    /// No edge between these two endpoints.
    #[error("no edge from {from} to {to}")]
    EdgeNotFound {
        /// Source output.
        from: Port,
        /// Target input.
        to: Port,
    },

    /// Adding this edge would create a cycle.
    #[error("connecting {from} to {to} would create a cycle")]
    CycleDetected {
        /// Source output.
        from: Port,
        /// Target input.
        to: Port,
    },

    /// An output was reached again while it was still propagating.
    #[error("output {0} is already propagating")]
    Reentrant(Port),

    /// The module is borrowed through its [`Node`](crate::Node) handle.
    #[error("module {0} is borrowed elsewhere")]
    ModuleBusy(ModuleId),

    /// Raised by a module.
    #[error(transparent)]
    Module(#[from] rheo_core::Error),

    /// The mutation stands, but a downstream consumer failed.
    ///
    /// Outputs and edges after the failing one were still pushed; `source`
    /// is the first failure.
    #[error("{applied}, then propagation failed: {source}")]
    Propagation {
        /// What the call changed.
        applied: Applied,
        /// First downstream failure.
        source: Box<GraphError>,
    },
}

impl GraphError {
    /// The error that stopped the work, looking through [`Propagation`](Self::Propagation).
    pub fn cause(&self) -> &GraphError {
        match self {
            Self::Propagation { source, .. } => source.cause(),
            other => other,
        }
    }

    /// The mutation that took effect despite the error, if any.
    ///
    /// `None` means the call was rejected and the graph is unchanged.
    pub fn applied(&self) -> Option<Applied> {
        match self {
            Self::Propagation { applied, .. } => Some(*applied),
            _ => None,
        }
    }
}

/// Result alias for graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;
