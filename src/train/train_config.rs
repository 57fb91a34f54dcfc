use std::sync::mpsc;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use crate::train::epoch_stats::EpochStats;
use crate::train::settings::Settings;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `settings`    - hyperparameters of the checkpoint loop
/// - `progress_tx` - optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the loop
///                   terminates at the next epoch boundary.
/// - `stop_flag`   - optional atomic flag; when set to `true` from another
///                   thread the loop terminates after the current epoch.
pub struct TrainConfig {
    pub settings: Settings,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Creates a minimal `TrainConfig` with no progress channel and no stop flag.
    pub fn new(settings: Settings) -> Self {
        TrainConfig {
            settings,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_flag.as_ref().map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    /// Sends `stats` if a channel is configured. Returns `false` once the
    /// receiver has gone away.
    pub(crate) fn report(&self, stats: EpochStats) -> bool {
        match self.progress_tx {
            Some(ref tx) => tx.send(stats).is_ok(),
            None => true,
        }
    }
}
