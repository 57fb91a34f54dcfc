use std::fmt;
use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use crate::activation::activation::Activation;
use crate::error::{NetError, Result};
use crate::layers::dense::Layer;
use crate::network::checkpoint::Checkpoint;
use crate::train::loop_fn::train_loop;
use crate::train::sample::TrainingSample;
use crate::train::settings::Settings;
use crate::train::train_config::TrainConfig;

/// A layered feed-forward network with a rollback checkpoint.
///
/// Layer 0 is the input layer: it has no connections and simply exposes the
/// sample it was given. Every later layer reads the previous layer's output.
#[derive(Debug)]
pub struct Network {
    layers: Vec<Layer>,
    checkpoint: Checkpoint,
    // error cascade buffer, sized to the widest layer
    scratch: Vec<f64>,
}

impl Network {
    /// Builds a network from `(width, activation)` pairs, input layer first,
    /// using the thread-local RNG for the initial weights.
    pub fn new(layer_specs: Vec<(usize, Arc<dyn Activation>)>) -> Result<Network> {
        Network::with_rng(layer_specs, &mut rand::thread_rng())
    }

    /// Same as [`Network::new`] with an explicit RNG.
    pub fn with_rng<R: Rng + ?Sized>(
        layer_specs: Vec<(usize, Arc<dyn Activation>)>,
        rng: &mut R,
    ) -> Result<Network> {
        if layer_specs.is_empty() {
            return Err(NetError::invalid("a network needs at least one layer"));
        }
        if let Some(index) = layer_specs.iter().position(|(width, _)| *width == 0) {
            return Err(NetError::invalid(format!("layer {index} has zero width")));
        }

        let mut layers = Vec::with_capacity(layer_specs.len());
        let mut input_width = 0;
        for (width, activation) in layer_specs {
            layers.push(Layer::new(width, input_width, &activation, rng));
            input_width = width;
        }

        Ok(Network::assemble(layers))
    }

    /// One shared activation for every layer.
    pub fn uniform(widths: &[usize], activation: Arc<dyn Activation>) -> Result<Network> {
        Network::uniform_with_rng(widths, activation, &mut rand::thread_rng())
    }

    pub fn uniform_with_rng<R: Rng + ?Sized>(
        widths: &[usize],
        activation: Arc<dyn Activation>,
        rng: &mut R,
    ) -> Result<Network> {
        let specs = widths.iter()
            .map(|&width| (width, Arc::clone(&activation)))
            .collect();
        Network::with_rng(specs, rng)
    }

    /// Assembles pre-built layers. The first layer must have no connections
    /// and each later layer must read exactly the previous layer's width.
    pub fn from_layers(layers: Vec<Layer>) -> Result<Network> {
        let first = layers.first()
            .ok_or_else(|| NetError::invalid("a network needs at least one layer"))?;
        NetError::check_width("input layer connections", 0, first.input_width())?;

        for pair in layers.windows(2) {
            NetError::check_width("layer input width", pair[0].width(), pair[1].input_width())?;
        }
        if let Some(index) = layers.iter().position(|layer| layer.width() == 0) {
            return Err(NetError::invalid(format!("layer {index} has zero width")));
        }

        Ok(Network::assemble(layers))
    }

    fn assemble(layers: Vec<Layer>) -> Network {
        let checkpoint = Checkpoint::capture(&layers);
        trace!(version = checkpoint.version(), "initial checkpoint");
        let widest = layers.iter().map(Layer::width).max().unwrap_or(0);
        Network { layers, checkpoint, scratch: Vec::with_capacity(widest) }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_width(&self) -> usize {
        self.layers[0].width()
    }

    pub fn output_width(&self) -> usize {
        self.output_layer().width()
    }

    /// How many snapshots have been taken, construction included.
    pub fn checkpoint_version(&self) -> u64 {
        self.checkpoint.version()
    }

    fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    /// Pushes `inputs` through every layer. Widths are the caller's concern.
    pub(crate) fn propagate(&mut self, inputs: &[f64]) {
        self.layers[0].set_output(inputs);

        for depth in 1..self.layers.len() {
            let (shallower, deeper) = self.layers.split_at_mut(depth);
            deeper[0].propagate(shallower[depth - 1].output());
        }
    }

    /// Runs inference on `inputs` and returns the output layer's values.
    /// Weights are left untouched.
    pub fn test(&mut self, inputs: &[f64]) -> Result<Vec<f64>> {
        NetError::check_width("input", self.input_width(), inputs.len())?;
        self.propagate(inputs);
        Ok(self.output_layer().output().to_vec())
    }

    /// One epoch of online gradient descent over `samples` visited in `order`,
    /// followed by a measuring pass. Returns the mean per-sample error under
    /// the updated weights.
    ///
    /// Samples must already have been checked with `validate_samples`.
    pub(crate) fn iterate(&mut self, samples: &[TrainingSample], order: &[usize]) -> f64 {
        let mut errors = std::mem::take(&mut self.scratch);

        for &index in order {
            let sample = &samples[index];

            self.propagate(&sample.inputs);
            self.output_layer().compute_errors_into(&sample.targets, &mut errors);

            // The input layer is never adjusted.
            for depth in (1..self.layers.len()).rev() {
                let (shallower, deeper) = self.layers.split_at_mut(depth);
                let upstream = deeper[0].back_propagate(shallower[depth - 1].output(), &errors);
                errors.clear();
                errors.extend_from_slice(upstream);
            }
        }
        self.scratch = errors;

        let mut total = 0.0;
        for sample in samples {
            self.propagate(&sample.inputs);
            total += self.output_layer().mean_error(&sample.targets);
        }
        total / samples.len() as f64
    }

    pub(crate) fn validate_samples(&self, samples: &[TrainingSample]) -> Result<()> {
        if samples.is_empty() {
            return Err(NetError::EmptyInput);
        }
        for sample in samples {
            NetError::check_width("sample inputs", self.input_width(), sample.inputs.len())?;
            NetError::check_width("sample targets", self.output_width(), sample.targets.len())?;
        }
        Ok(())
    }

    /// Snapshots the current layers.
    pub(crate) fn save(&mut self) {
        self.checkpoint.store(&self.layers);
        trace!(version = self.checkpoint.version(), "checkpoint saved");
    }

    /// Rolls the layers back to the last snapshot.
    pub(crate) fn restore(&mut self) {
        self.checkpoint.restore_into(&mut self.layers);
        trace!(version = self.checkpoint.version(), "checkpoint restored");
    }

    /// Trains with the thread-local RNG. See [`train_loop`] for the
    /// checkpoint rules.
    pub fn train(&mut self, samples: &[TrainingSample], settings: &Settings) -> Result<f64> {
        self.train_with_rng(samples, settings, &mut rand::thread_rng())
    }

    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        samples: &[TrainingSample],
        settings: &Settings,
        rng: &mut R,
    ) -> Result<f64> {
        train_loop(self, samples, &TrainConfig::new(*settings), rng)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Network: ")?;
        for layer in &self.layers {
            write!(f, "{} ", layer.width())?;
        }
        for (index, layer) in self.layers.iter().enumerate() {
            write!(f, "\n\t[Layer {}]\n{}", index + 1, layer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::activation::ActivationFunction;
    use crate::layers::unit::Unit;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sigmoid() -> Arc<dyn Activation> {
        ActivationFunction::Sigmoid.shared()
    }

    fn weights(network: &Network) -> Vec<Vec<f64>> {
        network.layers().iter()
            .flat_map(|layer| layer.units())
            .map(|unit| unit.weights().to_vec())
            .collect()
    }

    fn xor() -> Vec<TrainingSample> {
        vec![
            TrainingSample::new(vec![0.0, 0.0], vec![0.0]),
            TrainingSample::new(vec![0.0, 1.0], vec![1.0]),
            TrainingSample::new(vec![1.0, 0.0], vec![1.0]),
            TrainingSample::new(vec![1.0, 1.0], vec![0.0]),
        ]
    }

    #[test]
    fn widths_chain_through_layers() {
        let mut rng = StdRng::seed_from_u64(3);
        let network = Network::uniform_with_rng(&[4, 8, 3], sigmoid(), &mut rng).unwrap();

        assert_eq!(network.input_width(), 4);
        assert_eq!(network.output_width(), 3);
        assert_eq!(network.layers()[0].input_width(), 0);
        for pair in network.layers().windows(2) {
            assert_eq!(pair[1].input_width(), pair[0].width());
        }
        assert_eq!(network.checkpoint_version(), 1);
    }

    #[test]
    fn rejects_empty_and_zero_width_architectures() {
        assert!(matches!(Network::new(Vec::new()), Err(NetError::InvalidConfiguration(_))));
        assert!(matches!(
            Network::uniform(&[2, 0, 1], sigmoid()),
            Err(NetError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn from_layers_checks_the_width_chain() {
        let mut rng = StdRng::seed_from_u64(3);
        let layers = vec![
            Layer::new(2, 0, &sigmoid(), &mut rng),
            Layer::new(1, 3, &sigmoid(), &mut rng),
        ];
        assert!(matches!(Network::from_layers(layers), Err(NetError::ShapeMismatch { .. })));

        let headless = vec![Layer::new(1, 2, &sigmoid(), &mut rng)];
        assert!(matches!(Network::from_layers(headless), Err(NetError::ShapeMismatch { .. })));
    }

    #[test]
    fn fixed_weight_forward_pass() {
        let mut rng = StdRng::seed_from_u64(3);
        let input = Layer::new(2, 0, &sigmoid(), &mut rng);
        let output = Layer::from_units(vec![Unit::with_weights(vec![1.0, 1.0], sigmoid())]).unwrap();
        let mut network = Network::from_layers(vec![input, output]).unwrap();

        let out = network.test(&[0.5, 0.5]).unwrap();
        assert_eq!(out.len(), 1);
        assert_abs_diff_eq!(out[0], 0.731_058_6, epsilon = 1e-7);
    }

    #[test]
    fn test_is_repeatable_and_leaves_weights_alone() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut network = Network::uniform_with_rng(&[3, 5, 2], sigmoid(), &mut rng).unwrap();
        let before = weights(&network);

        let first = network.test(&[0.1, 0.9, 0.4]).unwrap();
        let second = network.test(&[0.1, 0.9, 0.4]).unwrap();
        assert_eq!(first, second);
        assert_eq!(weights(&network), before);
    }

    #[test]
    fn test_rejects_wrong_input_width() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut network = Network::uniform_with_rng(&[3, 2], sigmoid(), &mut rng).unwrap();
        let err = network.test(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, NetError::ShapeMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn restore_undoes_an_epoch_bit_for_bit() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::uniform_with_rng(&[2, 3, 1], sigmoid(), &mut rng).unwrap();
        let samples = xor();
        network.save();
        let snapshot = weights(&network);

        network.iterate(&samples, &[0, 1, 2, 3]);
        assert_ne!(weights(&network), snapshot);

        network.restore();
        assert_eq!(weights(&network), snapshot);
        let momentums_zero = network.layers().iter()
            .flat_map(|layer| layer.units())
            .all(|unit| unit.momentums().iter().all(|&m| m == 0.0));
        assert!(momentums_zero);
    }

    #[test]
    fn checkpoint_is_independent_of_live_layers() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut network = Network::uniform_with_rng(&[2, 3, 1], sigmoid(), &mut rng).unwrap();
        let stored: Vec<Vec<f64>> = network.checkpoint.layers().iter()
            .flat_map(|layer| layer.units())
            .map(|unit| unit.weights().to_vec())
            .collect();

        network.iterate(&xor(), &[3, 2, 1, 0]);

        let still: Vec<Vec<f64>> = network.checkpoint.layers().iter()
            .flat_map(|layer| layer.units())
            .map(|unit| unit.weights().to_vec())
            .collect();
        assert_eq!(stored, still);
    }

    #[test]
    fn iterate_reuses_the_error_buffer() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut network = Network::uniform_with_rng(&[2, 8, 1], sigmoid(), &mut rng).unwrap();
        assert!(network.scratch.capacity() >= 8);
        let buffer = network.scratch.as_ptr();

        network.iterate(&xor(), &[0, 1, 2, 3]);
        network.iterate(&xor(), &[3, 2, 1, 0]);

        assert_eq!(network.scratch.as_ptr(), buffer);
    }

    #[test]
    fn iterate_reports_error_after_updates() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut network = Network::uniform_with_rng(&[2, 3, 1], sigmoid(), &mut rng).unwrap();
        let samples = xor();

        let reported = network.iterate(&samples, &[0, 1, 2, 3]);

        let mut measured = 0.0;
        for sample in &samples {
            let out = network.test(&sample.inputs).unwrap();
            measured += (sample.targets[0] - out[0]).abs();
        }
        assert_abs_diff_eq!(reported, measured / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn validate_samples_catches_every_shape_error() {
        let mut rng = StdRng::seed_from_u64(9);
        let network = Network::uniform_with_rng(&[2, 1], sigmoid(), &mut rng).unwrap();

        assert!(matches!(network.validate_samples(&[]), Err(NetError::EmptyInput)));
        let wide_input = [TrainingSample::new(vec![0.0; 3], vec![0.0])];
        assert!(matches!(
            network.validate_samples(&wide_input),
            Err(NetError::ShapeMismatch { what: "sample inputs", .. })
        ));
        let wide_target = [TrainingSample::new(vec![0.0; 2], vec![0.0, 1.0])];
        assert!(matches!(
            network.validate_samples(&wide_target),
            Err(NetError::ShapeMismatch { what: "sample targets", .. })
        ));
    }

    #[test]
    fn non_finite_inputs_propagate_as_nan() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut network = Network::uniform_with_rng(&[2, 2, 1], sigmoid(), &mut rng).unwrap();
        let out = network.test(&[f64::NAN, 0.0]).unwrap();
        assert!(out[0].is_nan());
    }

    #[test]
    fn display_lists_widths_and_weights() {
        let mut rng = StdRng::seed_from_u64(2);
        let input = Layer::new(2, 0, &sigmoid(), &mut rng);
        let output = Layer::from_units(vec![Unit::with_weights(vec![0.5, -1.0], sigmoid())]).unwrap();
        let network = Network::from_layers(vec![input, output]).unwrap();

        let text = network.to_string();
        assert!(text.starts_with("Network: 2 1 "));
        assert!(text.contains("[Layer 2]"));
        assert!(text.contains("[1]: 0.5 -1 "));
    }
}
