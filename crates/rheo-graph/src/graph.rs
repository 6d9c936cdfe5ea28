//! The propagation graph.
//!
//! [`Graph`] records which output feeds which input and keeps every connected
//! input consistent with its source. Any mutation that goes through the graph
//! (setting an input, adding or removing an entry on a multi-input, running a
//! trigger, connecting, disconnecting) runs synchronously:
//!
//! 1. the module method is called
//! 2. caches of the outputs the endpoint affects are dropped
//! 3. each affected output, in endpoint-table order, is recomputed and
//!    delivered along its edges in registration order
//! 4. every delivery recurses depth-first before the next edge is visited
//!
//! A call either fails before changing anything, or it takes effect and
//! propagates in full. In the second case a downstream failure does not stop
//! the remaining outputs and edges from being pushed; the first one comes back
//! as [`GraphError::Propagation`] along with what the call [`Applied`].
//!
//! Cycles are rejected at connect time. The dependency relation used for that
//! check is endpoint-level: edges run output → input, and each module's
//! `affects` declarations run input → output. A module may therefore feed one
//! of its own inputs as long as that input does not affect the output.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::endpoint::{EndpointDescriptor, EndpointKind, position};
use crate::error::{Applied, GraphError, Result};
use crate::module::{InputId, Module};
use crate::node::{EdgeId, ModuleId, Node, Port};
use crate::payload::{Payload, PayloadType};

/// Bookkeeping for one registered module.
struct ModuleEntry {
    module: Weak<RefCell<dyn Module>>,
    name: &'static str,
    endpoints: &'static [EndpointDescriptor],
    /// Per endpoint: indices of the outputs it invalidates, ascending.
    affects: Vec<Vec<usize>>,
    /// Per endpoint: last computed value of a memoized output; `None` when dirty.
    cache: Vec<Option<Payload>>,
    incoming: Vec<EdgeId>,
    outgoing: Vec<EdgeId>,
}

struct Edge {
    from: Port,
    to: Port,
    /// Entry owned by this edge on a multi-input target.
    slot: Option<InputId>,
}

/// Read-only view of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Edge identifier.
    pub id: EdgeId,
    /// Source output.
    pub from: Port,
    /// Target input or trigger.
    pub to: Port,
    /// Input id owned on a multi-input target.
    pub slot: Option<InputId>,
}

/// Directed graph of module endpoints with synchronous propagation.
///
/// Modules are owned by the caller through [`Node`] handles; the graph holds
/// weak references only. `Graph` is neither `Send` nor `Sync`.
///
/// # Example
///
/// ```rust
/// use rheo_graph::{EndpointDescriptor, Graph, Module, Payload, PayloadKind};
///
/// struct Constant(f64);
///
/// impl Module for Constant {
///     fn endpoints(&self) -> &'static [EndpointDescriptor] {
///         const ENDPOINTS: &[EndpointDescriptor] = &[
///             EndpointDescriptor::input("set", PayloadKind::Float).affecting(&["value"]),
///             EndpointDescriptor::output("value", PayloadKind::Float),
///         ];
///         ENDPOINTS
///     }
///
///     fn set_input(&mut self, _index: usize, value: Payload) -> rheo_core::Result<()> {
///         self.0 = value.into_value()?;
///         Ok(())
///     }
///
///     fn output(&self, _index: usize) -> rheo_core::Result<Payload> {
///         Ok(Payload::Float(self.0))
///     }
/// }
///
/// let mut graph = Graph::new();
/// let a = graph.add(Constant(1.0));
/// let b = graph.add(Constant(0.0));
/// graph.connect(a.port(1usize), b.port(0usize)).unwrap();
/// assert_eq!(b.borrow().0, 1.0);
///
/// graph.set_input(a.port(0usize), 5.0).unwrap();
/// assert_eq!(graph.output_as::<f64>(b.port(1usize)).unwrap(), 5.0);
/// ```
#[derive(Default)]
pub struct Graph {
    modules: Vec<Option<ModuleEntry>>,
    edges: Vec<Option<Edge>>,
    /// Outputs currently delivering along their edges.
    active: Vec<Port>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Modules
    // -----------------------------------------------------------------------

    /// Registers a module and hands back the owning handle.
    pub fn add<M: Module + 'static>(&mut self, module: M) -> Node<M> {
        let id = ModuleId(self.modules.len() as u32);
        let inner = Rc::new(RefCell::new(module));
        let (name, endpoints) = {
            let module = inner.borrow();
            (module.name(), module.endpoints())
        };
        let dynamic: Rc<RefCell<dyn Module>> = inner.clone();
        self.modules.push(Some(ModuleEntry {
            module: Rc::downgrade(&dynamic),
            name,
            endpoints,
            affects: resolve_affects(name, endpoints),
            cache: vec![None; endpoints.len()],
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }));
        tracing::debug!("graph_add: {name} as {id}");
        Node::new(id, inner)
    }

    /// Looks up an endpoint of `node` by name.
    pub fn find_port<M: Module>(&self, node: &Node<M>, name: &str) -> Result<Port> {
        let entry = self.entry(node.id())?;
        position(entry.endpoints, name)
            .map(|index| node.port(index))
            .ok_or_else(|| GraphError::EndpointNotFound {
                module: node.id(),
                endpoint: name.to_owned(),
            })
    }

    /// Endpoint table of a registered module.
    pub fn endpoints(&self, module: ModuleId) -> Result<&'static [EndpointDescriptor]> {
        self.entry(module).map(|entry| entry.endpoints)
    }

    /// Number of registered modules that are still alive.
    pub fn module_count(&self) -> usize {
        self.modules
            .iter()
            .flatten()
            .filter(|entry| entry.module.strong_count() > 0)
            .count()
    }

    /// Forgets every module whose owner dropped it, along with its edges.
    ///
    /// Returns the number of modules removed. Consumers keep whatever value
    /// was last delivered to them.
    pub fn prune(&mut self) -> usize {
        let dead: Vec<ModuleId> = self
            .modules
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                slot.as_ref()
                    .filter(|entry| entry.module.strong_count() == 0)
                    .map(|_| ModuleId(i as u32))
            })
            .collect();
        for &id in &dead {
            self.prune_module(id);
        }
        dead.len()
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Connects an output to an input, multi-input or trigger.
    ///
    /// The output's current value is delivered at once. Connecting a pair
    /// that is already connected returns the existing edge and delivers
    /// nothing. If the target rejects the initial value, no edge is created.
    ///
    /// Failures further downstream come back as
    /// [`Propagation`](GraphError::Propagation) with
    /// [`Applied::Connected`]; the edge stays.
    pub fn connect(&mut self, from: Port, to: Port) -> Result<EdgeId> {
        let source = self.descriptor(from)?;
        if source.kind != EndpointKind::Output {
            return Err(GraphError::WrongEndpointKind {
                port: from,
                actual: source.kind,
                expected: "an output",
            });
        }
        let target = self.descriptor(to)?;
        if !target.kind.is_sink() {
            return Err(GraphError::WrongEndpointKind {
                port: to,
                actual: target.kind,
                expected: "an input or trigger",
            });
        }
        if target.kind != EndpointKind::Trigger && !target.payload.accepts(source.payload) {
            return Err(GraphError::TypeMismatch {
                port: to,
                expected: target.payload,
                found: source.payload,
            });
        }
        if let Some(id) = self.find_edge(from, to) {
            tracing::trace!("graph_connect: {from} → {to} already connected as {id}");
            return Ok(id);
        }
        if self.can_reach(to, from) {
            tracing::warn!("graph_connect: {from} → {to} rejected, would create a cycle");
            return Err(GraphError::CycleDetected { from, to });
        }

        let module = self.upgrade(to.module)?;
        let value = self.read_output(from)?;
        let slot = Self::deliver(&module, to, target, None, value)?;

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge { from, to, slot }));
        self.entry_mut(from.module)?.outgoing.push(id);
        self.entry_mut(to.module)?.incoming.push(id);
        tracing::debug!("graph_connect: {from} → {to} as {id}");

        self.settle(to, Applied::Connected(id)).map(|()| id)
    }

    /// Removes the edge between `from` and `to`.
    ///
    /// A multi-input target loses the entry the edge owned. The target then
    /// re-notifies its own downstream consumers.
    pub fn disconnect(&mut self, from: Port, to: Port) -> Result<()> {
        let id = self
            .find_edge(from, to)
            .ok_or(GraphError::EdgeNotFound { from, to })?;
        let slot = self.edge(id).and_then(|edge| edge.slot);

        let Ok(module) = self.upgrade(to.module) else {
            // Upgrading pruned the dead target together with this edge.
            return Ok(());
        };
        let target = self.descriptor(to)?;
        if let (EndpointKind::MultiInput, Some(slot)) = (target.kind, slot) {
            module
                .try_borrow_mut()
                .map_err(|_| GraphError::ModuleBusy(to.module))?
                .remove_input(to.index, slot)?;
        }
        self.unlink(id);
        tracing::debug!("graph_disconnect: {from} → {to} ({id})");

        self.settle(to, Applied::Disconnected(id))
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Edges leaving `output`, in registration order.
    pub fn edges_from(&self, output: Port) -> Vec<Connection> {
        self.connections(output, true)
    }

    /// Edges arriving at `input`, in registration order.
    pub fn edges_into(&self, input: Port) -> Vec<Connection> {
        self.connections(input, false)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Sets an [`Input`](EndpointKind::Input) endpoint and propagates.
    pub fn set_input(&mut self, port: Port, value: impl Into<Payload>) -> Result<()> {
        let descriptor = self.expect_kind(port, EndpointKind::Input, "an input")?;
        let module = self.upgrade(port.module)?;
        Self::deliver(&module, port, descriptor, None, value.into())?;
        self.settle(port, Applied::Changed(port))
    }

    /// Adds an entry to a [`MultiInput`](EndpointKind::MultiInput) endpoint and
    /// propagates.
    ///
    /// If propagation fails the entry stays and its id travels in
    /// [`Applied::InputAdded`].
    pub fn add_input(&mut self, port: Port, value: impl Into<Payload>) -> Result<InputId> {
        let descriptor = self.expect_kind(port, EndpointKind::MultiInput, "a multi-input")?;
        let module = self.upgrade(port.module)?;
        let slot = Self::deliver(&module, port, descriptor, None, value.into())?;
        let id = slot.ok_or_else(|| {
            GraphError::Module(rheo_core::Error::reference(format!(
                "{port} returned no input id"
            )))
        })?;
        tracing::debug!("graph_add_input: {port} gained {id}");
        self.settle(port, Applied::InputAdded(id)).map(|()| id)
    }

    /// Replaces an entry on a multi-input and propagates.
    pub fn replace_input(
        &mut self,
        port: Port,
        id: InputId,
        value: impl Into<Payload>,
    ) -> Result<()> {
        let descriptor = self.expect_kind(port, EndpointKind::MultiInput, "a multi-input")?;
        let module = self.upgrade(port.module)?;
        Self::deliver(&module, port, descriptor, Some(id), value.into())?;
        self.settle(port, Applied::Changed(port))
    }

    /// Removes an entry from a multi-input and propagates.
    pub fn remove_input(&mut self, port: Port, id: InputId) -> Result<()> {
        self.expect_kind(port, EndpointKind::MultiInput, "a multi-input")?;
        let module = self.upgrade(port.module)?;
        module
            .try_borrow_mut()
            .map_err(|_| GraphError::ModuleBusy(port.module))?
            .remove_input(port.index, id)?;
        tracing::debug!("graph_remove_input: {port} lost {id}");
        self.settle(port, Applied::Changed(port))
    }

    /// Runs a [`Trigger`](EndpointKind::Trigger) and propagates.
    pub fn trigger(&mut self, port: Port) -> Result<()> {
        self.expect_kind(port, EndpointKind::Trigger, "a trigger")?;
        let module = self.upgrade(port.module)?;
        module
            .try_borrow_mut()
            .map_err(|_| GraphError::ModuleBusy(port.module))?
            .trigger(port.index)?;
        self.settle(port, Applied::Changed(port))
    }

    /// Drops every cache of `module` and pushes all of its outputs downstream.
    ///
    /// Use after mutating a module directly through [`Node::borrow_mut`].
    /// Every output is pushed even if an earlier one fails; the first failure
    /// is returned as is, since the graph itself changed nothing.
    pub fn refresh(&mut self, module: ModuleId) -> Result<()> {
        self.upgrade(module)?;
        let entry = self.entry_mut(module)?;
        entry.cache.iter_mut().for_each(|value| *value = None);
        let outputs: Vec<usize> = entry
            .endpoints
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EndpointKind::Output)
            .map(|(i, _)| i)
            .collect();
        let mut failure = None;
        for index in outputs {
            if let Err(err) = self.push(Port { module, index }) {
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    // -----------------------------------------------------------------------
    // Outputs
    // -----------------------------------------------------------------------

    /// Reads an output, from cache when the output is memoized and clean.
    pub fn output(&mut self, port: Port) -> Result<Payload> {
        self.read_output(port)
    }

    /// Reads an output and converts it to `T`.
    pub fn output_as<T: PayloadType>(&mut self, port: Port) -> Result<T> {
        Ok(self.read_output(port)?.into_value::<T>()?)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn entry(&self, id: ModuleId) -> Result<&ModuleEntry> {
        self.modules
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(GraphError::ModuleNotFound(id))
    }

    fn entry_mut(&mut self, id: ModuleId) -> Result<&mut ModuleEntry> {
        self.modules
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(GraphError::ModuleNotFound(id))
    }

    fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Strong reference to a live module; prunes it if the owner dropped it.
    fn upgrade(&mut self, id: ModuleId) -> Result<Rc<RefCell<dyn Module>>> {
        let module = self.entry(id)?.module.upgrade();
        module.ok_or_else(|| {
            self.prune_module(id);
            GraphError::ModuleNotFound(id)
        })
    }

    fn descriptor(&self, port: Port) -> Result<EndpointDescriptor> {
        self.entry(port.module)?
            .endpoints
            .get(port.index)
            .copied()
            .ok_or_else(|| GraphError::EndpointNotFound {
                module: port.module,
                endpoint: port.index.to_string(),
            })
    }

    fn expect_kind(
        &self,
        port: Port,
        kind: EndpointKind,
        expected: &'static str,
    ) -> Result<EndpointDescriptor> {
        let descriptor = self.descriptor(port)?;
        if descriptor.kind == kind {
            Ok(descriptor)
        } else {
            Err(GraphError::WrongEndpointKind {
                port,
                actual: descriptor.kind,
                expected,
            })
        }
    }

    fn connections(&self, port: Port, outgoing: bool) -> Vec<Connection> {
        let Ok(entry) = self.entry(port.module) else {
            return Vec::new();
        };
        let ids = if outgoing { &entry.outgoing } else { &entry.incoming };
        ids.iter()
            .filter_map(|&id| {
                self.edge(id)
                    .filter(|edge| if outgoing { edge.from == port } else { edge.to == port })
                    .map(|edge| Connection {
                        id,
                        from: edge.from,
                        to: edge.to,
                        slot: edge.slot,
                    })
            })
            .collect()
    }

    fn find_edge(&self, from: Port, to: Port) -> Option<EdgeId> {
        let entry = self.entry(from.module).ok()?;
        entry.outgoing.iter().copied().find(|&id| {
            self.edge(id)
                .is_some_and(|edge| edge.from == from && edge.to == to)
        })
    }

    /// Removes an edge from the edge table and both adjacency lists.
    fn unlink(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.0 as usize)?.take()?;
        if let Some(Some(entry)) = self.modules.get_mut(edge.from.module.0 as usize) {
            entry.outgoing.retain(|&e| e != id);
        }
        if let Some(Some(entry)) = self.modules.get_mut(edge.to.module.0 as usize) {
            entry.incoming.retain(|&e| e != id);
        }
        Some(edge)
    }

    fn prune_module(&mut self, id: ModuleId) {
        let Some(entry) = self.modules.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        let edges: Vec<EdgeId> = entry
            .incoming
            .iter()
            .chain(&entry.outgoing)
            .copied()
            .collect();
        for &edge in &edges {
            self.unlink(edge);
        }
        tracing::warn!(
            "graph_prune: {} ({id}) was dropped, removed {} edges",
            entry.name,
            edges.len()
        );
    }

    /// True if `target` depends on `start` through edges and `affects`.
    fn can_reach(&self, start: Port, target: Port) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![start];

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            let Ok(entry) = self.entry(current.module) else {
                continue;
            };
            let Some(descriptor) = entry.endpoints.get(current.index) else {
                continue;
            };
            if descriptor.kind == EndpointKind::Output {
                stack.extend(
                    entry
                        .outgoing
                        .iter()
                        .filter_map(|&id| self.edge(id))
                        .filter(|edge| edge.from == current)
                        .map(|edge| edge.to),
                );
            } else {
                stack.extend(entry.affects[current.index].iter().map(|&index| Port {
                    module: current.module,
                    index,
                }));
            }
        }
        false
    }

    /// Hands `value` to a sink endpoint, returning the multi-input slot.
    fn deliver(
        module: &Rc<RefCell<dyn Module>>,
        to: Port,
        descriptor: EndpointDescriptor,
        slot: Option<InputId>,
        value: Payload,
    ) -> Result<Option<InputId>> {
        if descriptor.kind != EndpointKind::Trigger && !descriptor.payload.accepts(value.kind()) {
            return Err(GraphError::TypeMismatch {
                port: to,
                expected: descriptor.payload,
                found: value.kind(),
            });
        }
        let mut module = module
            .try_borrow_mut()
            .map_err(|_| GraphError::ModuleBusy(to.module))?;
        tracing::trace!("graph_deliver: {:?} → {to} ({})", value.kind(), descriptor.name);
        match descriptor.kind {
            EndpointKind::Input => {
                module.set_input(to.index, value)?;
                Ok(None)
            }
            EndpointKind::MultiInput => match slot {
                Some(id) => {
                    module.replace_input(to.index, id, value)?;
                    Ok(Some(id))
                }
                None => Ok(Some(module.add_input(to.index, value)?)),
            },
            EndpointKind::Trigger => {
                module.trigger(to.index)?;
                Ok(None)
            }
            EndpointKind::Output => Err(GraphError::WrongEndpointKind {
                port: to,
                actual: descriptor.kind,
                expected: "an input or trigger",
            }),
        }
    }

    fn read_output(&mut self, port: Port) -> Result<Payload> {
        let descriptor = self.expect_kind(port, EndpointKind::Output, "an output")?;
        let module = self.upgrade(port.module)?;
        if descriptor.memoized {
            if let Some(value) = &self.entry(port.module)?.cache[port.index] {
                tracing::trace!("graph_output: {port} served from cache");
                return Ok(value.clone());
            }
        }
        let value = module
            .try_borrow()
            .map_err(|_| GraphError::ModuleBusy(port.module))?
            .output(port.index)?;
        if descriptor.memoized {
            self.entry_mut(port.module)?.cache[port.index] = Some(value.clone());
        }
        Ok(value)
    }

    /// Propagates an accepted mutation, tagging any failure with what was applied.
    fn settle(&mut self, changed: Port, applied: Applied) -> Result<()> {
        self.propagate(changed).map_err(|source| {
            tracing::warn!("graph_propagate: {applied}, downstream failed: {source}");
            GraphError::Propagation {
                applied,
                source: Box::new(source),
            }
        })
    }

    /// Invalidates what `changed` affects and pushes those outputs downstream.
    ///
    /// Keeps going after a failure and returns the first one.
    fn propagate(&mut self, changed: Port) -> Result<()> {
        let entry = self.entry_mut(changed.module)?;
        let outputs = entry.affects[changed.index].clone();
        for &output in &outputs {
            entry.cache[output] = None;
        }
        let mut failure = None;
        for index in outputs {
            let output = Port {
                module: changed.module,
                index,
            };
            if let Err(err) = self.push(output) {
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    fn push(&mut self, output: Port) -> Result<()> {
        let edges: Vec<EdgeId> = self
            .edges_from(output)
            .into_iter()
            .map(|connection| connection.id)
            .collect();
        if edges.is_empty() {
            return Ok(());
        }
        if self.active.contains(&output) {
            return Err(GraphError::Reentrant(output));
        }
        self.active.push(output);
        let result = self.push_edges(output, &edges);
        self.active.pop();
        result
    }

    fn push_edges(&mut self, output: Port, edges: &[EdgeId]) -> Result<()> {
        let value = self.read_output(output)?;
        let mut failure = None;
        for &id in edges {
            if let Err(err) = self.push_edge(id, &value) {
                failure.get_or_insert(err);
            }
        }
        failure.map_or(Ok(()), Err)
    }

    /// Delivers `value` along one edge, then propagates from its target.
    fn push_edge(&mut self, id: EdgeId, value: &Payload) -> Result<()> {
        let Some(edge) = self.edge(id) else {
            return Ok(());
        };
        let (to, slot) = (edge.to, edge.slot);
        let Ok(module) = self.upgrade(to.module) else {
            return Ok(());
        };
        let descriptor = self.descriptor(to)?;
        let slot = Self::deliver(&module, to, descriptor, slot, value.clone())?;
        if let Some(Some(edge)) = self.edges.get_mut(id.0 as usize) {
            edge.slot = slot;
        }
        self.propagate(to)
    }
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("modules", &self.module_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

/// Maps each endpoint's `affects` names to output indices.
fn resolve_affects(name: &str, endpoints: &[EndpointDescriptor]) -> Vec<Vec<usize>> {
    endpoints
        .iter()
        .map(|endpoint| {
            let mut outputs: Vec<usize> = endpoint
                .affects
                .iter()
                .filter_map(|target| {
                    let found = endpoints
                        .iter()
                        .position(|e| e.kind == EndpointKind::Output && e.name == *target);
                    if found.is_none() {
                        tracing::warn!(
                            "graph_add: {name}.{} affects unknown output '{target}'",
                            endpoint.name
                        );
                    }
                    found
                })
                .collect();
            outputs.sort_unstable();
            outputs.dedup();
            outputs
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rheo_core::Error;

    use super::*;
    use crate::endpoint::PayloadKind;

    /// Float pass-through with a gain; counts output computations.
    struct Scale {
        value: f64,
        gain: f64,
        reads: Rc<Cell<usize>>,
    }

    impl Scale {
        const SET_VALUE: usize = 0;
        const SET_GAIN: usize = 1;
        const PING: usize = 2;
        const SCALED: usize = 3;
        const GAIN: usize = 4;

        fn new(value: f64) -> Self {
            Self {
                value,
                gain: 1.0,
                reads: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Module for Scale {
        fn endpoints(&self) -> &'static [EndpointDescriptor] {
            const ENDPOINTS: &[EndpointDescriptor] = &[
                EndpointDescriptor::input("set_value", PayloadKind::Float).affecting(&["scaled"]),
                EndpointDescriptor::input("set_gain", PayloadKind::Float)
                    .affecting(&["scaled", "gain"]),
                EndpointDescriptor::trigger("ping"),
                EndpointDescriptor::output("scaled", PayloadKind::Float),
                EndpointDescriptor::output("gain", PayloadKind::Float).uncached(),
            ];
            ENDPOINTS
        }

        fn set_input(&mut self, index: usize, value: Payload) -> rheo_core::Result<()> {
            let value: f64 = value.into_value()?;
            if value.is_nan() {
                return Err(Error::validation("NaN"));
            }
            match index {
                Self::SET_VALUE => self.value = value,
                _ => self.gain = value,
            }
            Ok(())
        }

        fn trigger(&mut self, _index: usize) -> rheo_core::Result<()> {
            Ok(())
        }

        fn output(&self, index: usize) -> rheo_core::Result<Payload> {
            self.reads.set(self.reads.get() + 1);
            match index {
                Self::SCALED => Ok(Payload::Float(self.value * self.gain)),
                _ => Ok(Payload::Float(self.gain)),
            }
        }
    }

    /// Sums every connected float.
    #[derive(Default)]
    struct Sum {
        entries: Vec<(InputId, f64)>,
        next: u64,
    }

    impl Sum {
        const ADD: usize = 0;
        const TOTAL: usize = 1;
    }

    impl Module for Sum {
        fn endpoints(&self) -> &'static [EndpointDescriptor] {
            const ENDPOINTS: &[EndpointDescriptor] = &[
                EndpointDescriptor::multi_input("add", PayloadKind::Float).affecting(&["total"]),
                EndpointDescriptor::output("total", PayloadKind::Float),
            ];
            ENDPOINTS
        }

        fn add_input(&mut self, _index: usize, value: Payload) -> rheo_core::Result<InputId> {
            let id = InputId::new(self.next);
            self.next += 1;
            self.entries.push((id, value.into_value()?));
            Ok(id)
        }

        fn replace_input(
            &mut self,
            _index: usize,
            id: InputId,
            value: Payload,
        ) -> rheo_core::Result<()> {
            let entry = self
                .entries
                .iter_mut()
                .find(|(e, _)| *e == id)
                .ok_or_else(|| Error::reference(id.to_string()))?;
            entry.1 = value.into_value()?;
            Ok(())
        }

        fn remove_input(&mut self, _index: usize, id: InputId) -> rheo_core::Result<()> {
            let before = self.entries.len();
            self.entries.retain(|(e, _)| *e != id);
            if self.entries.len() == before {
                return Err(Error::reference(id.to_string()));
            }
            Ok(())
        }

        fn output(&self, _index: usize) -> rheo_core::Result<Payload> {
            Ok(Payload::Float(self.entries.iter().map(|(_, v)| v).sum()))
        }
    }

    #[test]
    fn connect_delivers_immediately() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(3.0));
        let b = graph.add(Scale::new(0.0));
        graph
            .connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE))
            .unwrap();
        assert_eq!(b.borrow().value, 3.0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn set_input_propagates_depth_first() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        let c = graph.add(Scale::new(0.0));
        graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        graph.connect(b.port(Scale::SCALED), c.port(Scale::SET_VALUE)).unwrap();

        graph.set_input(b.port(Scale::SET_GAIN), 10.0).unwrap();
        graph.set_input(a.port(Scale::SET_VALUE), 2.0).unwrap();
        assert_eq!(c.borrow().value, 20.0);
        assert_eq!(graph.output_as::<f64>(c.port(Scale::SCALED)).unwrap(), 20.0);
    }

    #[test]
    fn memoized_outputs_are_read_once() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let reads = Rc::clone(&a.borrow().reads);

        graph.output(a.port(Scale::SCALED)).unwrap();
        graph.output(a.port(Scale::SCALED)).unwrap();
        assert_eq!(reads.get(), 1);

        graph.output(a.port(Scale::GAIN)).unwrap();
        graph.output(a.port(Scale::GAIN)).unwrap();
        assert_eq!(reads.get(), 3);

        graph.set_input(a.port(Scale::SET_VALUE), 4.0).unwrap();
        assert_eq!(graph.output_as::<f64>(a.port(Scale::SCALED)).unwrap(), 4.0);
        assert_eq!(reads.get(), 4);
    }

    #[test]
    fn reconnecting_returns_the_same_edge_without_delivery() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        let first = graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        b.borrow_mut().value = -1.0;
        let second = graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        assert_eq!(first, second);
        assert_eq!(b.borrow().value, -1.0);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(1.0));
        graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        let err = graph
            .connect(b.port(Scale::SCALED), a.port(Scale::SET_GAIN))
            .unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
        assert_eq!(graph.edge_count(), 1);

        let self_loop = graph.connect(a.port(Scale::SCALED), a.port(Scale::SET_VALUE));
        assert!(matches!(self_loop, Err(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn triggers_without_affects_do_not_form_cycles() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        graph.connect(a.port(Scale::SCALED), a.port(Scale::PING)).unwrap();
        graph.set_input(a.port(Scale::SET_VALUE), 2.0).unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn kind_checks() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let s = graph.add(Sum::default());
        assert!(matches!(
            graph.connect(a.port(Scale::SET_VALUE), s.port(Sum::ADD)),
            Err(GraphError::WrongEndpointKind { .. })
        ));
        assert!(matches!(
            graph.set_input(s.port(Sum::ADD), 1.0),
            Err(GraphError::WrongEndpointKind { .. })
        ));
        assert!(matches!(
            graph.set_input(a.port(Scale::SET_VALUE), "text"),
            Err(GraphError::TypeMismatch { .. })
        ));
        assert!(matches!(
            graph.output(a.port(99usize)),
            Err(GraphError::EndpointNotFound { .. })
        ));
    }

    #[test]
    fn rejected_initial_value_leaves_no_edge() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(f64::NAN));
        let b = graph.add(Scale::new(0.0));
        let err = graph
            .connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE))
            .unwrap_err();
        assert!(matches!(err, GraphError::Module(Error::Validation(_))));
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edges_into(b.port(Scale::SET_VALUE)).is_empty());
    }

    #[test]
    fn accepted_changes_report_what_was_applied() {
        let mut graph = Graph::new();
        let sum = graph.add(Sum::default());
        let sink = graph.add(Scale::new(0.0));
        graph.connect(sum.port(Sum::TOTAL), sink.port(Scale::SET_VALUE)).unwrap();

        let err = graph.add_input(sum.port(Sum::ADD), f64::NAN).unwrap_err();
        let Some(Applied::InputAdded(id)) = err.applied() else {
            panic!("expected an added input, got {err:?}");
        };
        assert!(matches!(err.cause(), GraphError::Module(Error::Validation(_))));
        assert_eq!(sum.borrow().entries.len(), 1);

        graph.remove_input(sum.port(Sum::ADD), id).unwrap();
        assert!(sum.borrow().entries.is_empty());
        assert_eq!(sink.borrow().value, 0.0);

        let nan = graph.add(Scale::new(f64::NAN));
        let err = graph
            .connect(nan.port(Scale::SCALED), sum.port(Sum::ADD))
            .unwrap_err();
        let edge = graph.edges_from(nan.port(Scale::SCALED))[0].id;
        assert_eq!(err.applied(), Some(Applied::Connected(edge)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn a_failing_output_does_not_block_the_others() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        let c = graph.add(Scale::new(0.0));
        graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        graph.connect(a.port(Scale::GAIN), c.port(Scale::SET_VALUE)).unwrap();
        a.borrow_mut().value = f64::NAN;

        let err = graph.set_input(a.port(Scale::SET_GAIN), 3.0).unwrap_err();
        assert_eq!(err.applied(), Some(Applied::Changed(a.port(Scale::SET_GAIN))));
        assert!(matches!(err.cause(), GraphError::Module(Error::Validation(_))));
        assert_eq!(b.borrow().value, 1.0);
        assert_eq!(c.borrow().value, 3.0);
    }

    #[test]
    fn multi_input_edges_own_entries() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(2.0));
        let sum = graph.add(Sum::default());
        graph.connect(a.port(Scale::SCALED), sum.port(Sum::ADD)).unwrap();
        graph.connect(b.port(Scale::SCALED), sum.port(Sum::ADD)).unwrap();
        assert_eq!(graph.output_as::<f64>(sum.port(Sum::TOTAL)).unwrap(), 3.0);

        graph.set_input(a.port(Scale::SET_VALUE), 10.0).unwrap();
        assert_eq!(sum.borrow().entries.len(), 2);
        assert_eq!(graph.output_as::<f64>(sum.port(Sum::TOTAL)).unwrap(), 12.0);

        graph.disconnect(a.port(Scale::SCALED), sum.port(Sum::ADD)).unwrap();
        assert_eq!(sum.borrow().entries.len(), 1);
        assert_eq!(graph.output_as::<f64>(sum.port(Sum::TOTAL)).unwrap(), 2.0);
    }

    #[test]
    fn disconnect_unknown_edge() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(1.0));
        assert!(matches!(
            graph.disconnect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)),
            Err(GraphError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn dropped_modules_are_pruned() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        let target = b.port(Scale::SET_VALUE);
        drop(b);

        assert_eq!(graph.module_count(), 1);
        graph.set_input(a.port(Scale::SET_VALUE), 5.0).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(matches!(
            graph.set_input(target, 1.0),
            Err(GraphError::ModuleNotFound(_))
        ));
        assert_eq!(graph.prune(), 0);
    }

    #[test]
    fn refresh_pushes_direct_mutations() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        graph.connect(a.port(Scale::SCALED), b.port(Scale::SET_VALUE)).unwrap();
        a.borrow_mut().value = 7.0;
        graph.refresh(a.id()).unwrap();
        assert_eq!(b.borrow().value, 7.0);
    }

    #[test]
    fn busy_modules_are_reported() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let guard = a.borrow_mut();
        assert!(matches!(
            graph.output(a.port(Scale::SCALED)),
            Err(GraphError::ModuleBusy(_))
        ));
        drop(guard);
    }

    #[test]
    fn reentrant_delivery_is_an_error() {
        let mut graph = Graph::new();
        let a = graph.add(Scale::new(1.0));
        let b = graph.add(Scale::new(0.0));
        let output = a.port(Scale::SCALED);
        graph.connect(output, b.port(Scale::SET_VALUE)).unwrap();
        graph.active.push(output);
        let err = graph.set_input(a.port(Scale::SET_VALUE), 2.0).unwrap_err();
        assert_eq!(err.cause(), &GraphError::Reentrant(output));
        assert_eq!(err.applied(), Some(Applied::Changed(a.port(Scale::SET_VALUE))));
    }

    #[test]
    fn find_port_by_name() {
        let mut graph = Graph::new();
        let sum = graph.add(Sum::default());
        assert_eq!(graph.find_port(&sum, "total").unwrap(), sum.port(Sum::TOTAL));
        assert!(matches!(
            graph.find_port(&sum, "nope"),
            Err(GraphError::EndpointNotFound { .. })
        ));
    }
}
