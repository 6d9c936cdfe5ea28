//! Rheo Graph - synchronous propagation between module endpoints
//!
//! Modules expose a static table of typed endpoints: inputs, multi-inputs,
//! outputs and triggers. A [`Graph`] connects outputs to inputs and keeps every
//! consumer consistent with its producers: each mutation recomputes the
//! affected outputs and pushes them downstream, depth-first, before returning.
//!
//! # Core Abstractions
//!
//! - [`Module`] - the trait a processing module implements
//! - [`EndpointDescriptor`] - one entry of a module's endpoint table
//! - [`Payload`] - values carried along edges
//! - [`Graph`] - edge registry, output caches, propagation
//! - [`Node`] - owning handle returned by [`Graph::add`]
//! - [`Port`] - address of one endpoint
//!
//! # Ownership
//!
//! Modules belong to whoever holds their [`Node`]. The graph keeps weak
//! references and forgets a module's edges once it is gone. Everything is
//! single-threaded (`Rc`/`RefCell`); hosts that need threads serialize access
//! to the graph themselves.

pub mod endpoint;
pub mod error;
pub mod graph;
pub mod module;
pub mod node;
pub mod payload;

pub use endpoint::{EndpointDescriptor, EndpointKind, PayloadKind};
pub use error::{Applied, GraphError, Result};
pub use graph::{Connection, Graph};
pub use module::{InputId, Module};
pub use node::{EdgeId, ModuleId, Node, Port};
pub use payload::{Payload, PayloadType};
