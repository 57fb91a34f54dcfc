use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::{Activation, ActivationFunction};
use crate::error::{NetError, Result};
use crate::network::network::Network;
use crate::train::settings::Settings;

/// Describes one layer in a network specification.
///
/// Fields:
/// - `width`      - number of units in this layer
/// - `activation` - activation applied by every unit; ignored for the input
///                  layer, which performs no computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub width: usize,
    #[serde(default)]
    pub activation: ActivationFunction,
}

/// A fully serializable description of a network architecture plus the
/// settings to train it with.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of any
/// trained weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name.
    pub name: String,
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub settings: Settings,
}

impl NetworkSpec {
    /// One activation for every layer, default settings.
    pub fn uniform(name: &str, widths: &[usize], activation: ActivationFunction) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            layers: widths.iter()
                .map(|&width| LayerSpec { width, activation })
                .collect(),
            settings: Settings::default(),
        }
    }

    /// Checks the settings and that every layer has at least one unit.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(NetError::invalid(format!("spec '{}' has no layers", self.name)));
        }
        if let Some(index) = self.layers.iter().position(|layer| layer.width == 0) {
            return Err(NetError::invalid(format!(
                "spec '{}': layer {index} has zero width",
                self.name
            )));
        }
        self.settings.validate()
    }

    /// Builds a freshly initialised network for this architecture.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Network> {
        self.validate()?;
        let layers: Vec<(usize, Arc<dyn Activation>)> = self.layers.iter()
            .map(|layer| (layer.width, layer.activation.shared()))
            .collect();
        Network::with_rng(layers, rng)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes and validates a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let spec: NetworkSpec = serde_json::from_reader(reader)?;
        spec.validate()?;
        Ok(spec)
    }
}
