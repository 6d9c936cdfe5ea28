//! Static endpoint descriptors.
//!
//! Every [`Module`](crate::Module) publishes a fixed table of
//! [`EndpointDescriptor`]s. The graph addresses endpoints by their index in
//! that table and reads the table once, when the module is added.

/// Role of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    /// Typed setter holding one value.
    Input,
    /// Setter accepting many simultaneous values, one per input id.
    MultiInput,
    /// Typed getter, optionally memoized by the graph.
    Output,
    /// Argument-less action.
    Trigger,
}

impl EndpointKind {
    /// True for endpoints an edge may point at.
    #[inline]
    pub fn is_sink(self) -> bool {
        !matches!(self, EndpointKind::Output)
    }
}

/// Kind of value carried by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    /// [`rheo_core::Signal`]
    Signal,
    /// [`rheo_core::Spectrum`]
    Spectrum,
    /// `f64`
    Float,
    /// `i64`
    Integer,
    /// `bool`
    Flag,
    /// `String`
    Text,
    /// Plot data, `Vec<Vec<f64>>`
    Sequence,
    /// Accepts anything; used by triggers.
    Any,
}

impl PayloadKind {
    /// True if a value of kind `other` may be delivered to an endpoint of this kind.
    #[inline]
    pub fn accepts(self, other: PayloadKind) -> bool {
        self == PayloadKind::Any || self == other
    }
}

/// Describes one endpoint of a module.
///
/// Build tables with the `const` constructors:
///
/// ```rust
/// use rheo_graph::{EndpointDescriptor, PayloadKind};
///
/// const ENDPOINTS: &[EndpointDescriptor] = &[
///     EndpointDescriptor::input("set_gain", PayloadKind::Float).affecting(&["output"]),
///     EndpointDescriptor::trigger("reset").affecting(&["output"]),
///     EndpointDescriptor::output("output", PayloadKind::Signal),
/// ];
/// assert!(ENDPOINTS[2].memoized);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Name, unique within the module.
    pub name: &'static str,

    /// Role.
    pub kind: EndpointKind,

    /// Carried value kind. Triggers use [`PayloadKind::Any`].
    pub payload: PayloadKind,

    /// Names of the outputs this input or trigger invalidates.
    ///
    /// Always empty for outputs.
    pub affects: &'static [&'static str],

    /// Whether the graph caches this output between changes.
    ///
    /// Meaningless for non-outputs.
    pub memoized: bool,
}

impl EndpointDescriptor {
    const fn new(name: &'static str, kind: EndpointKind, payload: PayloadKind) -> Self {
        Self {
            name,
            kind,
            payload,
            affects: &[],
            memoized: false,
        }
    }

    /// Single-value input.
    pub const fn input(name: &'static str, payload: PayloadKind) -> Self {
        Self::new(name, EndpointKind::Input, payload)
    }

    /// Input accepting any number of simultaneous connections.
    pub const fn multi_input(name: &'static str, payload: PayloadKind) -> Self {
        Self::new(name, EndpointKind::MultiInput, payload)
    }

    /// Memoized output.
    pub const fn output(name: &'static str, payload: PayloadKind) -> Self {
        let mut descriptor = Self::new(name, EndpointKind::Output, payload);
        descriptor.memoized = true;
        descriptor
    }

    /// Trigger; accepts and discards any payload when connected.
    pub const fn trigger(name: &'static str) -> Self {
        Self::new(name, EndpointKind::Trigger, PayloadKind::Any)
    }

    /// Sets the outputs invalidated by this input or trigger.
    ///
    /// Builder pattern, call after a constructor.
    pub const fn affecting(mut self, outputs: &'static [&'static str]) -> Self {
        self.affects = outputs;
        self
    }

    /// Disables memoization for this output.
    pub const fn uncached(mut self) -> Self {
        self.memoized = false;
        self
    }
}

/// Finds the index of the endpoint named `name`.
pub fn position(endpoints: &[EndpointDescriptor], name: &str) -> Option<usize> {
    endpoints.iter().position(|e| e.name == name)
}
