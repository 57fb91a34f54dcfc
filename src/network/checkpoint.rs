use crate::layers::dense::Layer;

/// A full, independently owned copy of every layer's parameters.
///
/// `version` starts at 1 for the snapshot taken on construction and grows by
/// one on every capture.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    version: u64,
    layers: Vec<Layer>,
}

impl Checkpoint {
    pub(crate) fn capture(layers: &[Layer]) -> Checkpoint {
        Checkpoint { version: 1, layers: layers.to_vec() }
    }

    /// Overwrites the snapshot with `layers`, reusing its allocation.
    pub(crate) fn store(&mut self, layers: &[Layer]) {
        self.layers.clone_from_slice(layers);
        self.version += 1;
    }

    /// Copies the snapshot back over `layers`.
    pub(crate) fn restore_into(&self, layers: &mut [Layer]) {
        layers.clone_from_slice(&self.layers);
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
}
