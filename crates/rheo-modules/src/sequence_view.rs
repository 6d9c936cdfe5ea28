//! Presentation model of a sequence plot.
//!
//! [`SequenceView`] holds what a line plot of one or more sequences needs:
//! the x axis, the y rows, and whether the y axis is logarithmic. Drawing is
//! left to the host.

use rheo_core::{Error, Result};
use rheo_graph::{EndpointDescriptor, Module, Payload, PayloadKind};

/// Plot model for rows of samples over an evenly spaced x axis.
///
/// Each row is one line. The x axis has one point per sample of the first row,
/// spaced by the x resolution. In logarithmic mode the y data is reported in
/// decibels, `20·log10|y|`; the stored samples never change.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceView {
    sequence: Vec<Vec<f64>>,
    x_resolution: f64,
    log_y: bool,
}

impl Default for SequenceView {
    fn default() -> Self {
        Self {
            sequence: vec![vec![0.0, 0.0]],
            x_resolution: 1.0,
            log_y: false,
        }
    }
}

impl SequenceView {
    /// Creates a view of `[[0.0, 0.0]]` with resolution 1.0 and a linear y axis.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently shown.
    pub fn sequence(&self) -> &[Vec<f64>] {
        &self.sequence
    }

    /// Replaces the rows. At least one row with at least one sample is needed.
    pub fn set_sequence(&mut self, sequence: Vec<Vec<f64>>) -> Result<()> {
        if sequence.first().is_none_or(Vec::is_empty) {
            return Err(Error::validation("a sequence needs at least one sample"));
        }
        self.sequence = sequence;
        Ok(())
    }

    /// Gap between two x positions.
    pub fn x_resolution(&self) -> f64 {
        self.x_resolution
    }

    /// Sets the gap between two x positions.
    pub fn set_x_resolution(&mut self, resolution: f64) -> Result<()> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(Error::validation(format!(
                "x resolution must be positive, got {resolution}"
            )));
        }
        self.x_resolution = resolution;
        Ok(())
    }

    /// Switches the y axis to linear.
    pub fn linear_y(&mut self) {
        self.log_y = false;
    }

    /// Switches the y axis to decibels.
    pub fn logarithmic_y(&mut self) {
        self.log_y = true;
    }

    /// True while the y axis is logarithmic.
    pub fn is_log_y(&self) -> bool {
        self.log_y
    }

    /// X positions, one per sample of the first row.
    pub fn x_axis(&self) -> Vec<f64> {
        let length = self.sequence.first().map_or(0, Vec::len);
        (0..length)
            .map(|i| i as f64 * self.x_resolution)
            .collect()
    }

    /// Rows as they should be drawn on the current y scale.
    pub fn y_data(&self) -> Vec<Vec<f64>> {
        if !self.log_y {
            return self.sequence.clone();
        }
        self.sequence
            .iter()
            .map(|row| row.iter().map(|y| 20.0 * y.abs().log10()).collect())
            .collect()
    }
}

/// Endpoint indices of [`SequenceView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceViewPort {
    /// Sequence input.
    SetSequence,
    /// Float input.
    SetXResolution,
    /// Trigger.
    LinearY,
    /// Trigger.
    LogarithmicY,
    /// One-row sequence of x positions.
    XAxis,
    /// Rows on the current y scale.
    YData,
    /// Flag output.
    LogY,
}

impl SequenceViewPort {
    /// All ports, in endpoint-table order.
    pub const ALL: [SequenceViewPort; 7] = [
        SequenceViewPort::SetSequence,
        SequenceViewPort::SetXResolution,
        SequenceViewPort::LinearY,
        SequenceViewPort::LogarithmicY,
        SequenceViewPort::XAxis,
        SequenceViewPort::YData,
        SequenceViewPort::LogY,
    ];
}

impl From<SequenceViewPort> for usize {
    fn from(port: SequenceViewPort) -> usize {
        port as usize
    }
}

impl Module for SequenceView {
    fn endpoints(&self) -> &'static [EndpointDescriptor] {
        const ENDPOINTS: &[EndpointDescriptor] = &[
            EndpointDescriptor::input("set_sequence", PayloadKind::Sequence)
                .affecting(&["x_axis", "y_data"]),
            EndpointDescriptor::input("set_x_resolution", PayloadKind::Float)
                .affecting(&["x_axis"]),
            EndpointDescriptor::trigger("linear_y").affecting(&["y_data", "log_y"]),
            EndpointDescriptor::trigger("logarithmic_y").affecting(&["y_data", "log_y"]),
            EndpointDescriptor::output("x_axis", PayloadKind::Sequence),
            EndpointDescriptor::output("y_data", PayloadKind::Sequence),
            EndpointDescriptor::output("log_y", PayloadKind::Flag),
        ];
        ENDPOINTS
    }

    fn name(&self) -> &'static str {
        "SequenceView"
    }

    fn set_input(&mut self, index: usize, value: Payload) -> Result<()> {
        match SequenceViewPort::ALL.get(index) {
            Some(SequenceViewPort::SetSequence) => self.set_sequence(value.into_value()?),
            Some(SequenceViewPort::SetXResolution) => self.set_x_resolution(value.into_value()?),
            _ => Err(Error::reference(format!(
                "sequence view endpoint {index} is not an input"
            ))),
        }
    }

    fn trigger(&mut self, index: usize) -> Result<()> {
        match SequenceViewPort::ALL.get(index) {
            Some(SequenceViewPort::LinearY) => self.linear_y(),
            Some(SequenceViewPort::LogarithmicY) => self.logarithmic_y(),
            _ => {
                return Err(Error::reference(format!(
                    "sequence view endpoint {index} is not a trigger"
                )));
            }
        }
        tracing::trace!("sequence_view: log_y = {}", self.log_y);
        Ok(())
    }

    fn output(&self, index: usize) -> Result<Payload> {
        match SequenceViewPort::ALL.get(index) {
            Some(SequenceViewPort::XAxis) => Ok(Payload::Sequence(vec![self.x_axis()])),
            Some(SequenceViewPort::YData) => Ok(Payload::Sequence(self.y_data())),
            Some(SequenceViewPort::LogY) => Ok(Payload::Flag(self.log_y)),
            _ => Err(Error::reference(format!(
                "sequence view endpoint {index} is not an output"
            ))),
        }
    }
}
