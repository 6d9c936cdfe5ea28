//! Integration tests for rheo-graph propagation.
//!
//! Builds small graphs from container-carrying test modules and checks
//! delivery order, cache behavior, error propagation and cycle rejection
//! through the public API only.

use std::cell::RefCell;
use std::rc::Rc;

use rheo_core::{Error, Signal};
use rheo_graph::{
    Applied, EndpointDescriptor, GraphError, Graph, InputId, Module, Payload, PayloadKind,
};

/// Holds one signal; records every delivery in a shared log.
struct Relay {
    name: &'static str,
    value: Signal,
    log: Rc<RefCell<Vec<&'static str>>>,
}

impl Relay {
    const SET: usize = 0;
    const OUT: usize = 1;

    fn new(name: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> Self {
        Self {
            name,
            value: Signal::empty(),
            log: Rc::clone(log),
        }
    }
}

impl Module for Relay {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        const ENDPOINTS: &[EndpointDescriptor] = &[
            EndpointDescriptor::input("set", PayloadKind::Signal).affecting(&["out"]),
            EndpointDescriptor::output("out", PayloadKind::Signal),
        ];
        ENDPOINTS
    }

    fn set_input(&mut self, _index: usize, value: Payload) -> rheo_core::Result<()> {
        self.value = value.into_value()?;
        self.log.borrow_mut().push(self.name);
        Ok(())
    }

    fn output(&self, _index: usize) -> rheo_core::Result<Payload> {
        Ok(self.value.clone().into())
    }
}

/// Fails on read whenever it holds a signal longer than `limit`.
struct Picky {
    limit: usize,
    value: Signal,
}

impl Module for Picky {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        const ENDPOINTS: &[EndpointDescriptor] = &[
            EndpointDescriptor::input("set", PayloadKind::Signal).affecting(&["out"]),
            EndpointDescriptor::output("out", PayloadKind::Signal),
        ];
        ENDPOINTS
    }

    fn set_input(&mut self, _index: usize, value: Payload) -> rheo_core::Result<()> {
        self.value = value.into_value()?;
        Ok(())
    }

    fn output(&self, _index: usize) -> rheo_core::Result<Payload> {
        if self.value.len() > self.limit {
            return Err(Error::conflict("too long"));
        }
        Ok(self.value.clone().into())
    }
}

/// Counts entries on a multi-input of signals.
#[derive(Default)]
struct Counter {
    ids: Vec<InputId>,
    next: u64,
}

impl Module for Counter {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        const ENDPOINTS: &[EndpointDescriptor] = &[
            EndpointDescriptor::multi_input("add", PayloadKind::Signal).affecting(&["count"]),
            EndpointDescriptor::output("count", PayloadKind::Integer),
        ];
        ENDPOINTS
    }

    fn add_input(&mut self, _index: usize, _value: Payload) -> rheo_core::Result<InputId> {
        let id = InputId::new(self.next);
        self.next += 1;
        self.ids.push(id);
        Ok(id)
    }

    fn replace_input(&mut self, _index: usize, _id: InputId, _value: Payload) -> rheo_core::Result<()> {
        Ok(())
    }

    fn remove_input(&mut self, _index: usize, id: InputId) -> rheo_core::Result<()> {
        let position = self
            .ids
            .iter()
            .position(|&e| e == id)
            .ok_or_else(|| Error::reference(id.to_string()))?;
        self.ids.remove(position);
        Ok(())
    }

    fn output(&self, _index: usize) -> rheo_core::Result<Payload> {
        Ok(Payload::Integer(self.ids.len() as i64))
    }
}

fn ramp(len: usize) -> Signal {
    Signal::new([(0..len).map(|i| i as f64).collect::<Vec<_>>()], 48_000.0, vec![]).unwrap()
}

#[test]
fn fan_out_is_depth_first_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut graph = Graph::new();
    let root = graph.add(Relay::new("root", &log));
    let left = graph.add(Relay::new("left", &log));
    let left_child = graph.add(Relay::new("left_child", &log));
    let right = graph.add(Relay::new("right", &log));

    graph.connect(root.port(Relay::OUT), left.port(Relay::SET)).unwrap();
    graph.connect(root.port(Relay::OUT), right.port(Relay::SET)).unwrap();
    graph.connect(left.port(Relay::OUT), left_child.port(Relay::SET)).unwrap();
    log.borrow_mut().clear();

    graph.set_input(root.port(Relay::SET), ramp(4)).unwrap();
    assert_eq!(*log.borrow(), vec!["root", "left", "left_child", "right"]);
    assert_eq!(right.borrow().value, ramp(4));
}

#[test]
fn downstream_errors_surface_after_the_mutation() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut graph = Graph::new();
    let source = graph.add(Relay::new("source", &log));
    let picky = graph.add(Picky { limit: 3, value: Signal::empty() });
    let sink = graph.add(Relay::new("sink", &log));
    graph.connect(source.port(Relay::OUT), picky.port(0usize)).unwrap();
    graph.connect(picky.port(1usize), sink.port(Relay::SET)).unwrap();

    let err = graph.set_input(source.port(Relay::SET), ramp(5)).unwrap_err();
    assert_eq!(err.applied(), Some(Applied::Changed(source.port(Relay::SET))));
    assert!(matches!(err.cause(), GraphError::Module(Error::Conflict(_))));
    assert_eq!(source.borrow().value, ramp(5));
    assert_eq!(picky.borrow().value.len(), 5);
    assert_eq!(sink.borrow().value, Signal::empty());
}

#[test]
fn cycle_rejection_leaves_edges_unchanged() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut graph = Graph::new();
    let nodes: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|name| graph.add(Relay::new(name, &log)))
        .collect();
    graph.connect(nodes[0].port(Relay::OUT), nodes[1].port(Relay::SET)).unwrap();
    graph.connect(nodes[1].port(Relay::OUT), nodes[2].port(Relay::SET)).unwrap();

    let before = graph.edges_from(nodes[2].port(Relay::OUT));
    let err = graph
        .connect(nodes[2].port(Relay::OUT), nodes[0].port(Relay::SET))
        .unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected { .. }));
    assert_eq!(graph.edge_count(), 2);
    assert_eq!(graph.edges_from(nodes[2].port(Relay::OUT)), before);
}

#[test]
fn multi_input_edges_track_their_slots() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut graph = Graph::new();
    let a = graph.add(Relay::new("a", &log));
    let b = graph.add(Relay::new("b", &log));
    let counter = graph.add(Counter::default());
    let add = graph.find_port(&counter, "add").unwrap();
    let count = graph.find_port(&counter, "count").unwrap();

    graph.connect(a.port(Relay::OUT), add).unwrap();
    graph.connect(b.port(Relay::OUT), add).unwrap();
    let manual = graph.add_input(add, ramp(2)).unwrap();
    assert_eq!(graph.output_as::<i64>(count).unwrap(), 3);

    let into = graph.edges_into(add);
    assert_eq!(into.len(), 2);
    assert!(into.iter().all(|c| c.slot.is_some()));

    graph.set_input(a.port(Relay::SET), ramp(3)).unwrap();
    assert_eq!(counter.borrow().ids.len(), 3);

    graph.remove_input(add, manual).unwrap();
    graph.disconnect(b.port(Relay::OUT), add).unwrap();
    assert_eq!(graph.output_as::<i64>(count).unwrap(), 1);

    assert!(matches!(
        graph.remove_input(add, manual),
        Err(GraphError::Module(Error::Reference(_)))
    ));
}

#[test]
fn type_mismatch_on_connect() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut graph = Graph::new();
    let counter = graph.add(Counter::default());
    let relay = graph.add(Relay::new("relay", &log));
    let err = graph
        .connect(counter.port(1usize), relay.port(Relay::SET))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::TypeMismatch {
            expected: PayloadKind::Signal,
            found: PayloadKind::Integer,
            ..
        }
    ));
}

#[test]
fn output_as_reports_wrong_payload_type() {
    let mut graph = Graph::new();
    let counter = graph.add(Counter::default());
    assert!(matches!(
        graph.output_as::<Signal>(counter.port(1usize)),
        Err(GraphError::Module(Error::Validation(_)))
    ));
}
