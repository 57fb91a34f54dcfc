use serde::{Serialize, Deserialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Capability consumed by every unit: an output from a weighted sum, and the
/// slope of the function expressed in terms of that output.
///
/// Many units share one instance, so implementors are handed around as
/// `Arc<dyn Activation>` and must be immutable.
pub trait Activation: Debug + Send + Sync {
    /// Output for the weighted input sum `x`.
    fn compute(&self, x: f64) -> f64;

    /// Derivative at the point whose *output* was `y`.
    fn derivative(&self, y: f64) -> f64;
}

/// Built-in activations. Selectable from JSON configs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    /// Logistic sigmoid, the default.
    #[default]
    Sigmoid,
    Tanh,
    Identity,
}

impl ActivationFunction {
    /// Wraps the variant for sharing between layers.
    pub fn shared(self) -> Arc<dyn Activation> {
        Arc::new(self)
    }
}

impl Activation for ActivationFunction {
    fn compute(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Identity => x,
        }
    }

    // Output-space derivatives: the unit only remembers what it emitted.
    fn derivative(&self, y: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
            ActivationFunction::Identity => 1.0,
        }
    }
}
