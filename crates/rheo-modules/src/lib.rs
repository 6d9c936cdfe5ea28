//! Rheo Modules - processing modules for rheo graphs
//!
//! Every module here is usable on its own through a typed Rust API and, via
//! [`rheo_graph::Module`], as a node in a [`rheo_graph::Graph`]. Each one
//! publishes a port enum whose variants convert into endpoint indices:
//!
//! ```rust
//! use rheo_core::Signal;
//! use rheo_graph::Graph;
//! use rheo_modules::{MergePort, MergeSignals, SignalSource, SourcePort};
//!
//! let mut graph = Graph::new();
//! let left = graph.add(SignalSource::new(Signal::new([[1.0, 2.0]], 8.0, vec![]).unwrap()));
//! let right = graph.add(SignalSource::new(Signal::new([[3.0, 4.0]], 8.0, vec![]).unwrap()));
//! let merger = graph.add(MergeSignals::new());
//!
//! graph.connect(left.port(SourcePort::Value), merger.port(MergePort::AddInput)).unwrap();
//! graph.connect(right.port(SourcePort::Value), merger.port(MergePort::AddInput)).unwrap();
//! assert_eq!(merger.borrow().number_of_output_channels(), 2);
//!
//! // The merger rejects a rate that disagrees with its other input and keeps
//! // the entry it had.
//! graph.set_input(left.port(SourcePort::SetRate), 16.0).unwrap_err();
//! assert_eq!(merger.borrow().output().unwrap().sampling_rate(), 8.0);
//! ```
//!
//! # Modules
//!
//! - [`Merge`] - channel merger with ordering and length-conflict strategies
//! - [`Source`] - publishes a fixed container
//! - [`Algebra`] - elementwise arithmetic between two containers
//! - [`SequenceView`] - headless line-plot model

pub mod algebra;
pub mod merge;
pub mod sequence_view;
pub mod source;

pub use algebra::{Algebra, AlgebraPort, SignalAlgebra, SpectrumAlgebra};
pub use merge::{
    LengthConflictStrategy, Merge, MergePort, MergeSignals, MergeSpectrums, MergeStrategy,
};
pub use sequence_view::{SequenceView, SequenceViewPort};
pub use source::{SignalSource, Source, SourcePort, SpectrumSource};
