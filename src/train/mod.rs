pub mod epoch_stats;
pub mod loop_fn;
pub mod sample;
pub mod settings;
pub mod train_config;

pub use epoch_stats::{CheckpointAction, EpochStats};
pub use loop_fn::train_loop;
pub use sample::TrainingSample;
pub use settings::Settings;
pub use train_config::TrainConfig;
