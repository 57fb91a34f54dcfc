use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::layers::unit::Unit;
use crate::loss::mae::MaeLoss;

/// An ordered group of units reading the same inputs.
///
/// The layer owns two reusable buffers: `output`, the result of the last
/// propagation, and `errors`, the upstream error accumulator that units add
/// into during `back_propagate`. The accumulator is reset on every call and
/// never retained by the units.
#[derive(Debug, Clone)]
pub struct Layer {
    units: Vec<Unit>,
    input_width: usize,
    output: Vec<f64>,
    errors: Vec<f64>,
}

impl Layer {
    /// Builds `width` randomly initialised units, each with `input_width`
    /// connections. An `input_width` of 0 yields an input layer.
    pub fn new<R: Rng + ?Sized>(
        width: usize,
        input_width: usize,
        activation: &Arc<dyn Activation>,
        rng: &mut R,
    ) -> Layer {
        let units = (0..width)
            .map(|_| Unit::new(input_width, Arc::clone(activation), rng))
            .collect();

        Layer {
            units,
            input_width,
            output: vec![0.0; width],
            errors: vec![0.0; input_width],
        }
    }

    /// Wraps pre-built units. All of them must share one input width.
    pub fn from_units(units: Vec<Unit>) -> Result<Layer> {
        let input_width = match units.first() {
            Some(unit) => unit.input_width(),
            None => return Err(NetError::invalid("a layer needs at least one unit")),
        };
        for unit in &units {
            NetError::check_width("unit input width", input_width, unit.input_width())?;
        }

        let width = units.len();
        Ok(Layer {
            units,
            input_width,
            output: vec![0.0; width],
            errors: vec![0.0; input_width],
        })
    }

    /// Number of units.
    pub fn width(&self) -> usize {
        self.units.len()
    }

    pub fn input_width(&self) -> usize {
        self.input_width
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Result of the last propagation request.
    pub fn output(&self) -> &[f64] {
        &self.output
    }

    /// Runs every unit on `inputs`, writing into the output cache in place.
    ///
    /// # Panics
    /// If `inputs` does not match the input width.
    pub fn propagate(&mut self, inputs: &[f64]) {
        assert_eq!(inputs.len(), self.input_width, "inputs do not match layer input width");
        for (slot, unit) in self.output.iter_mut().zip(self.units.iter_mut()) {
            *slot = unit.compute(inputs);
        }
    }

    /// Replaces the output cache. Only meaningful for the input layer, whose
    /// units perform no computation.
    pub fn set_output(&mut self, outputs: &[f64]) {
        self.output.clear();
        self.output.extend_from_slice(outputs);
    }

    /// `targets[i] - output[i]` for every unit.
    ///
    /// # Panics
    /// If `targets` does not match the layer width.
    pub fn compute_errors(&self, targets: &[f64]) -> Vec<f64> {
        let mut errors = Vec::with_capacity(self.width());
        self.compute_errors_into(targets, &mut errors);
        errors
    }

    pub(crate) fn compute_errors_into(&self, targets: &[f64], errors: &mut Vec<f64>) {
        assert_eq!(targets.len(), self.output.len(), "targets do not match layer width");
        errors.clear();
        errors.extend(targets.iter().zip(self.output.iter()).map(|(t, o)| t - o));
    }

    /// Mean absolute difference between `expected` and the current output.
    ///
    /// # Panics
    /// If `expected` does not match the layer width.
    pub fn mean_error(&self, expected: &[f64]) -> f64 {
        MaeLoss::loss(&self.output, expected)
    }

    /// Adjusts every unit for its entry in `output_errors` and returns the
    /// error to hand to the previous layer. The returned slice is only valid
    /// until the next call.
    ///
    /// # Panics
    /// If `inputs` does not match the input width or `output_errors` does not
    /// match the layer width.
    pub fn back_propagate(&mut self, inputs: &[f64], output_errors: &[f64]) -> &[f64] {
        assert_eq!(inputs.len(), self.input_width, "inputs do not match layer input width");
        assert_eq!(output_errors.len(), self.units.len(), "errors do not match layer width");

        self.errors.iter_mut().for_each(|e| *e = 0.0);

        for (unit, &error) in self.units.iter_mut().zip(output_errors.iter()) {
            unit.adjust(error, inputs, &mut self.errors);
        }

        &self.errors
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, unit) in self.units.iter().enumerate() {
            writeln!(f, "\t\t[{}]: {}", index + 1, unit)?;
        }
        Ok(())
    }
}
