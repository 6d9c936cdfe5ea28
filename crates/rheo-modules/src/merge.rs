//! Channel merger.
//!
//! [`Merge`] collects any number of containers and concatenates their
//! channels into one output container. Two policies shape the result:
//!
//! - [`MergeStrategy`] decides the channel order
//! - [`LengthConflictStrategy`] decides what happens when inputs differ in
//!   length
//!
//! An empty input (see [`Container::is_empty`]) always contributes exactly one
//! all-zero channel, stretched to the output length, with no label. Empty
//! inputs never establish the output rate and never conflict with it.
//!
//! ```rust
//! use rheo_core::Signal;
//! use rheo_modules::{MergeSignals, MergeStrategy};
//!
//! let a = Signal::new([[1.0, 2.0], [3.0, 4.0]], 8.0, vec![]).unwrap();
//! let b = Signal::new([[5.0, 6.0]], 8.0, vec![]).unwrap();
//!
//! let mut merger = MergeSignals::new();
//! merger.set_merge_strategy(MergeStrategy::FirstChannelFirst);
//! merger.add_input(a).unwrap();
//! merger.add_input(b).unwrap();
//!
//! let merged = merger.output().unwrap();
//! assert_eq!(merged.channels(), [vec![1.0, 2.0], vec![5.0, 6.0], vec![3.0, 4.0]]);
//! ```

use std::fmt;
use std::str::FromStr;

use rheo_core::backend::Sample;
use rheo_core::{Container, EMPTY_LENGTH, Error, Result, Signal, Spectrum};
use rheo_graph::{EndpointDescriptor, InputId, Module, Payload, PayloadKind, PayloadType};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Order of the output channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Every channel of the first input, then every channel of the second, and
    /// so on.
    #[default]
    FirstSignalFirst,
    /// Channel 0 of each input in turn, then channel 1, and so on. Inputs drop
    /// out once their channels are exhausted.
    FirstChannelFirst,
}

impl MergeStrategy {
    /// All strategies.
    pub const ALL: [MergeStrategy; 2] = [
        MergeStrategy::FirstSignalFirst,
        MergeStrategy::FirstChannelFirst,
    ];

    /// Snake-case name, as used in configuration files and text payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            MergeStrategy::FirstSignalFirst => "first_signal_first",
            MergeStrategy::FirstChannelFirst => "first_channel_first",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown merge strategy '{s}'")))
    }
}

/// Handling of inputs whose channels differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthConflictStrategy {
    /// Reject a mismatching input when it is added. A conflict left over from
    /// another strategy fails the output.
    #[default]
    RaiseError,
    /// Accept everything; fail the output while non-empty inputs of different
    /// lengths coexist.
    RaiseErrorExceptEmpty,
    /// Pad every channel with trailing zeros to the longest non-empty input.
    FillWithZeros,
}

impl LengthConflictStrategy {
    /// All strategies.
    pub const ALL: [LengthConflictStrategy; 3] = [
        LengthConflictStrategy::RaiseError,
        LengthConflictStrategy::RaiseErrorExceptEmpty,
        LengthConflictStrategy::FillWithZeros,
    ];

    /// Snake-case name, as used in configuration files and text payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            LengthConflictStrategy::RaiseError => "raise_error",
            LengthConflictStrategy::RaiseErrorExceptEmpty => "raise_error_except_empty",
            LengthConflictStrategy::FillWithZeros => "fill_with_zeros",
        }
    }
}

impl fmt::Display for LengthConflictStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LengthConflictStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| Error::validation(format!("unknown length conflict strategy '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

/// Merges the channels of many containers into one.
///
/// Inputs keep their insertion order. Each one is addressed by the
/// [`InputId`] returned from [`add_input`](Merge::add_input); ids are never
/// reused.
#[derive(Debug, Clone)]
pub struct Merge<C> {
    inputs: Vec<(InputId, C)>,
    next_id: u64,
    strategy: MergeStrategy,
    length_conflict: LengthConflictStrategy,
}

/// Merger for [`Signal`]s.
pub type MergeSignals = Merge<Signal>;

/// Merger for [`Spectrum`]s; the resolution plays the part of the rate.
pub type MergeSpectrums = Merge<Spectrum>;

impl<C: Container> Default for Merge<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Container> Merge<C> {
    /// Creates a merger with the default strategies and no inputs.
    pub fn new() -> Self {
        Self::with_strategies(MergeStrategy::default(), LengthConflictStrategy::default())
    }

    /// Creates a merger with the given strategies and no inputs.
    pub fn with_strategies(
        strategy: MergeStrategy,
        length_conflict: LengthConflictStrategy,
    ) -> Self {
        Self {
            inputs: Vec::new(),
            next_id: 0,
            strategy,
            length_conflict,
        }
    }

    /// Current channel order.
    pub fn merge_strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Changes the channel order.
    pub fn set_merge_strategy(&mut self, strategy: MergeStrategy) {
        tracing::debug!("merge_strategy: {} → {strategy}", self.strategy);
        self.strategy = strategy;
    }

    /// Current length conflict handling.
    pub fn length_conflict_strategy(&self) -> LengthConflictStrategy {
        self.length_conflict
    }

    /// Changes the length conflict handling.
    ///
    /// Existing inputs are not re-validated; a conflict they carry shows up
    /// when the output is read.
    pub fn set_length_conflict_strategy(&mut self, strategy: LengthConflictStrategy) {
        tracing::debug!(
            "merge_length_conflict: {} → {strategy}",
            self.length_conflict
        );
        self.length_conflict = strategy;
    }

    /// Ids of the current inputs, in insertion order.
    pub fn input_ids(&self) -> Vec<InputId> {
        self.inputs.iter().map(|(id, _)| *id).collect()
    }

    /// The input stored under `id`.
    pub fn input(&self, id: InputId) -> Option<&C> {
        self.inputs
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, value)| value)
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// Appends an input.
    ///
    /// Fails with [`Error::Validation`], leaving the merger unchanged, if a
    /// non-empty `value` disagrees with the established rate, or with the
    /// length of an existing non-empty input under
    /// [`LengthConflictStrategy::RaiseError`].
    pub fn add_input(&mut self, value: C) -> Result<InputId> {
        self.check(&value, None)?;
        let id = InputId::new(self.next_id);
        self.next_id += 1;
        tracing::debug!(
            "merge_add: {id} ({} channels, length {})",
            value.channel_count(),
            value.len()
        );
        self.inputs.push((id, value));
        Ok(id)
    }

    /// Swaps the input stored under `id`, keeping its position.
    ///
    /// Validated like [`add_input`](Merge::add_input) against the other inputs.
    pub fn replace_input(&mut self, id: InputId, value: C) -> Result<()> {
        let position = self.position(id)?;
        self.check(&value, Some(id))?;
        tracing::debug!("merge_replace: {id} ({} channels)", value.channel_count());
        self.inputs[position].1 = value;
        Ok(())
    }

    /// Removes the input stored under `id`.
    pub fn remove_input(&mut self, id: InputId) -> Result<()> {
        let position = self.position(id)?;
        self.inputs.remove(position);
        tracing::debug!("merge_remove: {id}, {} inputs left", self.inputs.len());
        Ok(())
    }

    /// Number of channels [`output`](Merge::output) produces.
    ///
    /// Empty inputs count as one channel. With no inputs at all the output is
    /// the canonical empty container, which has one channel.
    pub fn number_of_output_channels(&self) -> usize {
        if self.inputs.is_empty() {
            return 1;
        }
        self.inputs
            .iter()
            .map(|(_, value)| if value.is_empty() { 1 } else { value.channel_count() })
            .sum()
    }

    /// Builds the merged container.
    ///
    /// Fails with [`Error::Conflict`] if non-empty inputs of different lengths
    /// are present and the strategy does not pad.
    pub fn output(&self) -> Result<C> {
        if self.inputs.is_empty() {
            return Ok(C::default());
        }
        let length = self.output_length()?;
        let spacing = self
            .inputs
            .iter()
            .map(|(_, value)| value)
            .find(|value| !value.is_empty())
            .or_else(|| self.inputs.first().map(|(_, value)| value))
            .map_or(C::DEFAULT_SPACING, |value| value.spacing());

        let columns: Vec<Vec<(Vec<C::Sample>, Option<String>)>> = self
            .inputs
            .iter()
            .map(|(_, value)| stretched(value, length))
            .collect();

        let count = self.number_of_output_channels();
        let mut channels = Vec::with_capacity(count);
        let mut labels = Vec::with_capacity(count);
        match self.strategy {
            MergeStrategy::FirstSignalFirst => {
                for (channel, label) in columns.into_iter().flatten() {
                    channels.push(channel);
                    labels.push(label);
                }
            }
            MergeStrategy::FirstChannelFirst => {
                let depth = columns.iter().map(Vec::len).max().unwrap_or(0);
                let mut columns: Vec<_> = columns.into_iter().map(Vec::into_iter).collect();
                for _ in 0..depth {
                    for (channel, label) in columns.iter_mut().filter_map(Iterator::next) {
                        channels.push(channel);
                        labels.push(label);
                    }
                }
            }
        }
        C::from_parts(channels, spacing, labels)
    }

    fn position(&self, id: InputId) -> Result<usize> {
        self.inputs
            .iter()
            .position(|(entry, _)| *entry == id)
            .ok_or_else(|| Error::reference(format!("merger has no input {id}")))
    }

    /// Add-time validation of `candidate` against every input except `skip`.
    fn check(&self, candidate: &C, skip: Option<InputId>) -> Result<()> {
        if candidate.is_empty() {
            return Ok(());
        }
        let others: Vec<&C> = self
            .inputs
            .iter()
            .filter(|(id, value)| Some(*id) != skip && !value.is_empty())
            .map(|(_, value)| value)
            .collect();

        if let Some(established) = others
            .first()
            .filter(|established| established.spacing() != candidate.spacing())
        {
            tracing::debug!("merge_reject: {} mismatch", C::SPACING_NAME);
            return Err(Error::validation(format!(
                "{} {} {} does not match the merged {} {}",
                C::NAME,
                C::SPACING_NAME,
                candidate.spacing(),
                C::SPACING_NAME,
                established.spacing()
            )));
        }

        if self.length_conflict == LengthConflictStrategy::RaiseError {
            if let Some(other) = others.iter().find(|value| value.len() != candidate.len()) {
                tracing::debug!("merge_reject: length mismatch");
                return Err(Error::validation(format!(
                    "{} length {} does not match the merged length {}",
                    C::NAME,
                    candidate.len(),
                    other.len()
                )));
            }
        }
        Ok(())
    }

    /// Channel length of the output under the current length strategy.
    fn output_length(&self) -> Result<usize> {
        let mut lengths = self
            .inputs
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(_, value)| value.len());
        let Some(first) = lengths.next() else {
            return Ok(EMPTY_LENGTH);
        };
        match self.length_conflict {
            LengthConflictStrategy::FillWithZeros => Ok(lengths.fold(first, usize::max)),
            LengthConflictStrategy::RaiseError | LengthConflictStrategy::RaiseErrorExceptEmpty => {
                match lengths.find(|&length| length != first) {
                    Some(other) => Err(Error::conflict(format!(
                        "inputs of length {first} and {other} cannot be merged under {}",
                        self.length_conflict
                    ))),
                    None => Ok(first),
                }
            }
        }
    }
}

/// Channels and labels of one input, zero-padded to `length`.
fn stretched<C: Container>(value: &C, length: usize) -> Vec<(Vec<C::Sample>, Option<String>)> {
    if value.is_empty() {
        return vec![(vec![<C::Sample as Sample>::ZERO; length], None)];
    }
    value
        .channels()
        .iter()
        .zip(value.labels())
        .map(|(channel, label)| {
            let mut channel = channel.clone();
            channel.resize(length, <C::Sample as Sample>::ZERO);
            (channel, label.clone())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Graph endpoints
// ---------------------------------------------------------------------------

/// Endpoint indices of [`Merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergePort {
    /// Multi-input of containers.
    AddInput,
    /// Text input naming a [`MergeStrategy`].
    SetMergeStrategy,
    /// Text input naming a [`LengthConflictStrategy`].
    SetLengthConflictStrategy,
    /// The merged container.
    Output,
    /// Channel count of the merged container.
    NumberOfOutputChannels,
}

impl MergePort {
    /// All ports, in endpoint-table order.
    pub const ALL: [MergePort; 5] = [
        MergePort::AddInput,
        MergePort::SetMergeStrategy,
        MergePort::SetLengthConflictStrategy,
        MergePort::Output,
        MergePort::NumberOfOutputChannels,
    ];

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl From<MergePort> for usize {
    fn from(port: MergePort) -> usize {
        port as usize
    }
}

impl<C: Container + PayloadType> Merge<C> {
    const ENDPOINTS: &'static [EndpointDescriptor] = &[
        EndpointDescriptor::multi_input("add_input", C::KIND)
            .affecting(&["output", "number_of_output_channels"]),
        EndpointDescriptor::input("set_merge_strategy", PayloadKind::Text).affecting(&["output"]),
        EndpointDescriptor::input("set_length_conflict_strategy", PayloadKind::Text)
            .affecting(&["output"]),
        EndpointDescriptor::output("output", C::KIND),
        EndpointDescriptor::output("number_of_output_channels", PayloadKind::Integer),
    ];
}

impl<C: Container + PayloadType> Module for Merge<C> {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        Self::ENDPOINTS
    }

    fn name(&self) -> &'static str {
        "Merge"
    }

    fn set_input(&mut self, index: usize, value: Payload) -> Result<()> {
        match MergePort::from_index(index) {
            Some(MergePort::SetMergeStrategy) => {
                let name: String = value.into_value()?;
                self.set_merge_strategy(name.parse()?);
                Ok(())
            }
            Some(MergePort::SetLengthConflictStrategy) => {
                let name: String = value.into_value()?;
                self.set_length_conflict_strategy(name.parse()?);
                Ok(())
            }
            _ => Err(not_a(index, "an input")),
        }
    }

    fn add_input(&mut self, index: usize, value: Payload) -> Result<InputId> {
        match MergePort::from_index(index) {
            Some(MergePort::AddInput) => Merge::add_input(self, value.into_value()?),
            _ => Err(not_a(index, "a multi-input")),
        }
    }

    fn replace_input(&mut self, index: usize, id: InputId, value: Payload) -> Result<()> {
        match MergePort::from_index(index) {
            Some(MergePort::AddInput) => Merge::replace_input(self, id, value.into_value()?),
            _ => Err(not_a(index, "a multi-input")),
        }
    }

    fn remove_input(&mut self, index: usize, id: InputId) -> Result<()> {
        match MergePort::from_index(index) {
            Some(MergePort::AddInput) => Merge::remove_input(self, id),
            _ => Err(not_a(index, "a multi-input")),
        }
    }

    fn output(&self, index: usize) -> Result<Payload> {
        match MergePort::from_index(index) {
            Some(MergePort::Output) => Ok(Merge::output(self)?.into()),
            Some(MergePort::NumberOfOutputChannels) => {
                Ok(Payload::Integer(self.number_of_output_channels() as i64))
            }
            _ => Err(not_a(index, "an output")),
        }
    }
}

fn not_a(index: usize, expected: &str) -> Error {
    Error::reference(format!("merge endpoint {index} is not {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rheo_core::{Complex64, labels};

    fn signal(channels: &[&[f64]], rate: f64, names: &[&str]) -> Signal {
        Signal::new(
            channels.iter().map(|c| c.to_vec()),
            rate,
            labels(names.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn strategy_names_roundtrip() {
        for strategy in MergeStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<MergeStrategy>().unwrap(), strategy);
        }
        for strategy in LengthConflictStrategy::ALL {
            assert_eq!(
                strategy.to_string().parse::<LengthConflictStrategy>().unwrap(),
                strategy
            );
        }
        assert!(matches!(
            "interleave".parse::<MergeStrategy>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn no_inputs_gives_the_empty_container() {
        let merger = MergeSignals::new();
        assert_eq!(merger.output().unwrap(), Signal::empty());
        assert_eq!(merger.number_of_output_channels(), 1);
    }

    #[test]
    fn first_signal_first_concatenates() {
        let mut merger = MergeSignals::new();
        merger.add_input(signal(&[&[1.0, 2.0], &[3.0, 4.0]], 10.0, &["a", "b"])).unwrap();
        merger.add_input(signal(&[&[5.0, 6.0]], 10.0, &["c"])).unwrap();
        let out = merger.output().unwrap();
        assert_eq!(out.channels(), [vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]);
        assert_eq!(out.labels(), &labels(["a", "b", "c"])[..]);
        assert_eq!(out.sampling_rate(), 10.0);
        assert_eq!(merger.number_of_output_channels(), 3);
    }

    #[test]
    fn first_channel_first_skips_exhausted_inputs() {
        let mut merger = MergeSignals::with_strategies(
            MergeStrategy::FirstChannelFirst,
            LengthConflictStrategy::RaiseError,
        );
        merger.add_input(signal(&[&[1.0], &[2.0], &[3.0]], 10.0, &["a0", "a1", "a2"])).unwrap();
        merger.add_input(signal(&[&[4.0], &[5.0]], 10.0, &["b0", "b1"])).unwrap();
        let out = merger.output().unwrap();
        assert_eq!(out.labels(), &labels(["a0", "b0", "a1", "b1", "a2"])[..]);
    }

    #[test]
    fn rejected_input_leaves_state_unchanged() {
        let mut merger = MergeSignals::new();
        let first = merger.add_input(signal(&[&[1.0, 2.0, 3.0]], 10.0, &[])).unwrap();
        let err = merger
            .add_input(signal(&[&[1.0, 2.0, 3.0, 4.0, 5.0]], 10.0, &[]))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        let err = merger.add_input(signal(&[&[1.0, 2.0, 3.0]], 20.0, &[])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(merger.input_ids(), vec![first]);
        assert_eq!(merger.output().unwrap().channels(), [vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn empty_inputs_neither_set_nor_break_the_rate() {
        let mut merger = MergeSignals::new();
        merger.add_input(Signal::new([[0.0, 0.0]], 5.0, vec![]).unwrap()).unwrap();
        merger.add_input(signal(&[&[1.0, 2.0, 3.0]], 10.0, &["x"])).unwrap();
        let out = merger.output().unwrap();
        assert_eq!(out.sampling_rate(), 10.0);
        assert_eq!(out.channels(), [vec![0.0; 3], vec![1.0, 2.0, 3.0]]);
        assert_eq!(out.labels(), [None, Some("x".to_string())]);
    }

    #[test]
    fn only_empty_inputs_use_the_first_rate() {
        let mut merger = MergeSignals::new();
        merger.add_input(Signal::new([[0.0, 0.0], [0.0, 0.0]], 5.0, vec![]).unwrap()).unwrap();
        merger.add_input(Signal::empty()).unwrap();
        let out = merger.output().unwrap();
        assert_eq!(out.sampling_rate(), 5.0);
        assert_eq!(out.channels(), [vec![0.0, 0.0], vec![0.0, 0.0]]);
        assert_eq!(merger.number_of_output_channels(), 2);
    }

    #[test]
    fn fill_with_zeros_pads_to_the_longest() {
        let mut merger = MergeSignals::with_strategies(
            MergeStrategy::FirstSignalFirst,
            LengthConflictStrategy::FillWithZeros,
        );
        merger.add_input(signal(&[&[1.0, 2.0, 3.0]], 10.0, &[])).unwrap();
        let short = merger.add_input(signal(&[&[4.0, 5.0]], 10.0, &[])).unwrap();
        assert_eq!(
            merger.output().unwrap().channels(),
            [vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 0.0]]
        );
        merger.remove_input(short).unwrap();
        assert_eq!(merger.output().unwrap().channels(), [vec![1.0, 2.0, 3.0]]);
    }

    #[test]
    fn deferred_conflicts_fail_the_output() {
        let mut merger = MergeSignals::with_strategies(
            MergeStrategy::FirstSignalFirst,
            LengthConflictStrategy::RaiseErrorExceptEmpty,
        );
        merger.add_input(signal(&[&[1.0, 2.0, 3.0]], 10.0, &[])).unwrap();
        let short = merger.add_input(signal(&[&[4.0, 5.0]], 10.0, &[])).unwrap();
        assert!(matches!(merger.output(), Err(Error::Conflict(_))));
        merger.remove_input(short).unwrap();
        assert!(merger.output().is_ok());
    }

    #[test]
    fn replace_keeps_position_and_validates() {
        let mut merger = MergeSignals::new();
        let a = merger.add_input(signal(&[&[1.0, 1.0]], 10.0, &["a"])).unwrap();
        merger.add_input(signal(&[&[2.0, 2.0]], 10.0, &["b"])).unwrap();
        merger.replace_input(a, signal(&[&[3.0, 3.0]], 10.0, &["c"])).unwrap();
        assert_eq!(merger.output().unwrap().labels(), &labels(["c", "b"])[..]);

        let err = merger.replace_input(a, signal(&[&[3.0, 3.0, 3.0]], 10.0, &[])).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // The only non-empty input may change length freely.
        let mut single = MergeSignals::new();
        let only = single.add_input(signal(&[&[1.0, 1.0]], 10.0, &[])).unwrap();
        single.replace_input(only, signal(&[&[1.0, 2.0, 3.0]], 20.0, &[])).unwrap();
        assert_eq!(single.output().unwrap().sampling_rate(), 20.0);
    }

    #[test]
    fn unknown_ids_are_reference_errors() {
        let mut merger = MergeSignals::new();
        let id = merger.add_input(Signal::empty()).unwrap();
        merger.remove_input(id).unwrap();
        assert!(matches!(merger.remove_input(id), Err(Error::Reference(_))));
        assert!(matches!(
            merger.replace_input(id, Signal::empty()),
            Err(Error::Reference(_))
        ));
    }

    #[test]
    fn spectrums_merge_by_resolution() {
        let one = Complex64::new(1.0, 0.0);
        let a = Spectrum::new([[one, one]], 2.0, vec![]).unwrap();
        let b = Spectrum::new([[one, one]], 3.0, vec![]).unwrap();
        let mut merger = MergeSpectrums::new();
        merger.add_input(a.clone()).unwrap();
        assert!(matches!(merger.add_input(b), Err(Error::Validation(_))));
        merger.add_input(a).unwrap();
        let out = merger.output().unwrap();
        assert_eq!(out.resolution(), 2.0);
        assert_eq!(out.channel_count(), 2);
    }

    #[test]
    fn endpoint_table_matches_ports() {
        let merger = MergeSignals::new();
        let table = merger.endpoints();
        assert_eq!(table.len(), MergePort::ALL.len());
        assert_eq!(table[usize::from(MergePort::AddInput)].payload, PayloadKind::Signal);
        assert_eq!(table[usize::from(MergePort::Output)].name, "output");
        assert_eq!(
            MergeSpectrums::new().endpoints()[usize::from(MergePort::Output)].payload,
            PayloadKind::Spectrum
        );
    }

    #[test]
    fn text_payloads_select_strategies() {
        let mut merger = MergeSignals::new();
        Module::set_input(
            &mut merger,
            MergePort::SetMergeStrategy.into(),
            Payload::from("first_channel_first"),
        )
        .unwrap();
        assert_eq!(merger.merge_strategy(), MergeStrategy::FirstChannelFirst);
        let err = Module::set_input(
            &mut merger,
            MergePort::SetLengthConflictStrategy.into(),
            Payload::from("truncate"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(merger.length_conflict_strategy(), LengthConflictStrategy::RaiseError);
    }

    #[test]
    fn strategies_serialize_snake_case() {
        let json = serde_json::to_string(&LengthConflictStrategy::RaiseErrorExceptEmpty).unwrap();
        assert_eq!(json, "\"raise_error_except_empty\"");
        let back: MergeStrategy = serde_json::from_str("\"first_channel_first\"").unwrap();
        assert_eq!(back, MergeStrategy::FirstChannelFirst);
    }
}
