pub mod checkpoint;
pub mod network;
pub mod spec;

pub use checkpoint::Checkpoint;
pub use network::Network;
pub use spec::{NetworkSpec, LayerSpec};
