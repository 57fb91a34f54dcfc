use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::activation::activation::Activation;

/// A single neuron: one weight and one momentum per input connection.
///
/// Units of the input layer have no connections at all. Their layer copies
/// raw inputs straight into its output, so such units are never computed or
/// adjusted.
#[derive(Debug, Clone)]
pub struct Unit {
    weights: Vec<f64>,
    momentums: Vec<f64>,
    output: f64,
    error: f64,
    activation: Arc<dyn Activation>,
}

impl Unit {
    /// Creates a unit with `input_width` weights drawn uniformly from
    /// `[-0.5, 0.5]` and zeroed momentums.
    pub fn new<R: Rng + ?Sized>(
        input_width: usize,
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Unit {
        let weights = (0..input_width).map(|_| rng.gen_range(-0.5..=0.5)).collect();
        Unit {
            weights,
            momentums: vec![0.0; input_width],
            output: 0.0,
            error: 0.0,
            activation,
        }
    }

    /// Creates a unit with fixed weights and zeroed momentums.
    pub fn with_weights(weights: Vec<f64>, activation: Arc<dyn Activation>) -> Unit {
        let momentums = vec![0.0; weights.len()];
        Unit {
            weights,
            momentums,
            output: 0.0,
            error: 0.0,
            activation,
        }
    }

    pub fn input_width(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn momentums(&self) -> &[f64] {
        &self.momentums
    }

    /// Result of the last `compute`.
    pub fn output(&self) -> f64 {
        self.output
    }

    /// Local error signal from the last `adjust`.
    pub fn error(&self) -> f64 {
        self.error
    }

    /// Weighted sum of `inputs` through the activation. The result is kept
    /// for the next `adjust`.
    ///
    /// # Panics
    /// If `inputs.len()` differs from the unit's input width.
    pub fn compute(&mut self, inputs: &[f64]) -> f64 {
        assert_eq!(inputs.len(), self.weights.len(), "inputs do not match unit input width");

        let sum: f64 = self.weights.iter()
            .zip(inputs.iter())
            .map(|(w, x)| w * x)
            .sum();

        self.output = self.activation.compute(sum);
        self.output
    }

    /// Applies one momentum step for the received `error` and adds this
    /// unit's contribution to the upstream error in `accumulator`.
    ///
    /// There is no learning rate: each weight moves by the new momentum plus
    /// the previous one. The upstream contribution uses the updated weight.
    ///
    /// # Panics
    /// If `inputs` or `accumulator` differ from the unit's input width.
    pub fn adjust(&mut self, error: f64, inputs: &[f64], accumulator: &mut [f64]) {
        assert_eq!(inputs.len(), self.weights.len(), "inputs do not match unit input width");
        assert_eq!(accumulator.len(), self.weights.len(), "accumulator does not match unit input width");

        self.error = self.activation.derivative(self.output) * error;

        for (i, &input) in inputs.iter().enumerate() {
            let previous = self.momentums[i];
            let momentum = input * self.error;

            self.momentums[i] = momentum;
            self.weights[i] += momentum + previous;
            accumulator[i] += self.weights[i] * self.error;
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for weight in &self.weights {
            write!(f, "{weight} ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_weights_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let unit = Unit::new(64, ActivationFunction::Sigmoid.shared(), &mut rng);

        assert_eq!(unit.input_width(), 64);
        assert!(unit.weights().iter().all(|w| (-0.5..=0.5).contains(w)));
        assert!(unit.momentums().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn input_unit_has_no_connections() {
        let mut rng = StdRng::seed_from_u64(7);
        let unit = Unit::new(0, ActivationFunction::Sigmoid.shared(), &mut rng);
        assert!(unit.weights().is_empty());
        assert!(unit.momentums().is_empty());
    }

    #[test]
    fn compute_applies_activation_to_weighted_sum() {
        let mut unit = Unit::with_weights(vec![1.0, 1.0], ActivationFunction::Sigmoid.shared());
        let out = unit.compute(&[0.5, 0.5]);
        assert_abs_diff_eq!(out, 0.731_058_578_6, epsilon = 1e-9);
        assert_eq!(unit.output(), out);
    }

    #[test]
    fn adjust_adds_new_and_previous_momentum() {
        let mut unit = Unit::with_weights(vec![0.5, -0.25], ActivationFunction::Identity.shared());
        let inputs = [1.0, 2.0];
        unit.compute(&inputs);

        let mut acc = vec![0.0; 2];
        unit.adjust(0.1, &inputs, &mut acc);
        // identity derivative is 1, so the local error equals the received one
        assert_abs_diff_eq!(unit.error(), 0.1);
        assert_abs_diff_eq!(unit.momentums()[0], 0.1);
        assert_abs_diff_eq!(unit.momentums()[1], 0.2);
        assert_abs_diff_eq!(unit.weights()[0], 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(unit.weights()[1], -0.05, epsilon = 1e-12);
        // accumulation uses the updated weights
        assert_abs_diff_eq!(acc[0], 0.06, epsilon = 1e-12);
        assert_abs_diff_eq!(acc[1], -0.005, epsilon = 1e-12);

        let mut acc = vec![0.0; 2];
        unit.adjust(0.1, &inputs, &mut acc);
        assert_abs_diff_eq!(unit.weights()[0], 0.6 + 0.1 + 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(unit.weights()[1], -0.05 + 0.2 + 0.2, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "inputs do not match unit input width")]
    fn compute_rejects_short_inputs() {
        let mut unit = Unit::with_weights(vec![1.0, 1.0], ActivationFunction::Identity.shared());
        unit.compute(&[5.0]);
    }

    #[test]
    #[should_panic(expected = "inputs do not match unit input width")]
    fn adjust_rejects_long_inputs() {
        let mut unit = Unit::with_weights(vec![1.0, 1.0], ActivationFunction::Identity.shared());
        unit.compute(&[1.0, 1.0]);
        unit.adjust(0.1, &[1.0, 1.0, 1.0], &mut [0.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "accumulator does not match unit input width")]
    fn adjust_rejects_short_accumulator() {
        let mut unit = Unit::with_weights(vec![1.0, 1.0], ActivationFunction::Identity.shared());
        unit.compute(&[1.0, 1.0]);
        unit.adjust(0.1, &[1.0, 1.0], &mut [0.0]);
    }

    #[test]
    fn adjust_accumulates_into_shared_buffer() {
        let mut acc = vec![1.0, 1.0];
        let mut unit = Unit::with_weights(vec![0.0, 0.0], ActivationFunction::Identity.shared());
        unit.compute(&[0.0, 0.0]);
        unit.adjust(0.0, &[0.0, 0.0], &mut acc);
        assert_eq!(acc, vec![1.0, 1.0]);
    }
}
