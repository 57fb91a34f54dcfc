pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::activation::{Activation, ActivationFunction};
pub use error::{NetError, Result};
pub use layers::dense::Layer;
pub use layers::unit::Unit;
pub use network::network::Network;
pub use network::spec::{NetworkSpec, LayerSpec};
pub use train::epoch_stats::{CheckpointAction, EpochStats};
pub use train::loop_fn::train_loop;
pub use train::sample::TrainingSample;
pub use train::settings::Settings;
pub use train::train_config::TrainConfig;
