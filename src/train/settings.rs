use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{NetError, Result};

/// Hyperparameters of the checkpoint training loop.
///
/// # Fields
/// - `max_iterations`    - epochs to run at most, the reference epoch included
/// - `target_error`      - mean error at or below which training stops
/// - `store_threshold`   - in `[0, 1]`; the state is checkpointed when an epoch
///                         ends below `last_committed_error * store_threshold`
/// - `restore_threshold` - at least `1`; the epoch is rolled back when it ends
///                         above `last_committed_error * restore_threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub max_iterations: u32,
    pub target_error: f64,
    pub store_threshold: f64,
    pub restore_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_iterations: 10_000,
            target_error: 0.01,
            store_threshold: 0.99,
            restore_threshold: 1.0,
        }
    }
}

impl Settings {
    /// Builds validated settings.
    pub fn new(
        max_iterations: u32,
        target_error: f64,
        store_threshold: f64,
        restore_threshold: f64,
    ) -> Result<Settings> {
        let settings = Settings {
            max_iterations,
            target_error,
            store_threshold,
            restore_threshold,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(NetError::invalid("max_iterations must be at least 1"));
        }
        if !self.target_error.is_finite() || self.target_error < 0.0 {
            return Err(NetError::invalid(format!(
                "target_error must be a non-negative number, got {}",
                self.target_error
            )));
        }
        if !(0.0..=1.0).contains(&self.store_threshold) {
            return Err(NetError::invalid(format!(
                "store_threshold must lie in [0, 1], got {}",
                self.store_threshold
            )));
        }
        if !self.restore_threshold.is_finite() || self.restore_threshold < 1.0 {
            return Err(NetError::invalid(format!(
                "restore_threshold must be at least 1, got {}",
                self.restore_threshold
            )));
        }
        Ok(())
    }

    /// Serializes the settings to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Reads settings from a JSON file and validates them.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Settings> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let settings: Settings = serde_json::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }
}
