use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::error::Result;
use crate::network::network::Network;
use crate::train::epoch_stats::{CheckpointAction, EpochStats};
use crate::train::sample::TrainingSample;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on `samples` and returns the final mean error.
///
/// The first epoch visits the samples in order and its result becomes the
/// reference checkpoint. Every later epoch uses a fresh shuffle and ends in
/// one of four ways, checked in this order:
/// - error `<= target_error`: stop;
/// - error below `reference * store_threshold`: checkpoint it and make it the
///   new reference;
/// - error above `reference * restore_threshold`: roll back to the checkpoint
///   (the thresholds stay as they were);
/// - otherwise keep the weights and carry on.
///
/// After the loop the last epoch is committed if it beat the reference, or
/// rolled back if it was worse, so the returned error never exceeds the
/// error of the first epoch.
///
/// # Early termination
/// Besides convergence and `max_iterations`, the loop stops at the next epoch
/// boundary if `config.stop_flag` is set or the `progress_tx` receiver has
/// been dropped. The final correction still applies.
///
/// # Errors
/// Fails before touching the network if the settings are out of range, if
/// `samples` is empty, or if any sample does not match the network widths.
pub fn train_loop<R: Rng + ?Sized>(
    network: &mut Network,
    samples: &[TrainingSample],
    config: &TrainConfig,
    rng: &mut R,
) -> Result<f64> {
    let settings = &config.settings;
    settings.validate()?;
    network.validate_samples(samples)?;

    info!(
        samples = samples.len(),
        max_iterations = settings.max_iterations,
        "training started"
    );
    let started = Instant::now();

    // ── Reference epoch ───────────────────────────────────────────────────
    let mut order: Vec<usize> = (0..samples.len()).collect();

    let t_start = Instant::now();
    let mut error = network.iterate(samples, &order);
    network.save();

    let mut previous_error = error;
    let mut store_threshold = error * settings.store_threshold;
    let mut restore_threshold = error * settings.restore_threshold;

    let mut epoch = 1;
    let mut running = config.report(EpochStats {
        epoch,
        max_iterations: settings.max_iterations,
        error,
        best_error: previous_error,
        action: CheckpointAction::Baseline,
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    });

    // ── Checkpointed epochs ───────────────────────────────────────────────
    while running && epoch < settings.max_iterations {
        if config.stop_requested() {
            break;
        }

        let t_start = Instant::now();
        order.shuffle(rng);
        error = network.iterate(samples, &order);
        epoch += 1;

        let action = if error <= settings.target_error {
            CheckpointAction::Converged
        } else if error < store_threshold {
            previous_error = error;
            store_threshold = error * settings.store_threshold;
            restore_threshold = error * settings.restore_threshold;
            network.save();
            CheckpointAction::Commit
        } else if error > restore_threshold {
            network.restore();
            CheckpointAction::Rollback
        } else {
            CheckpointAction::Hold
        };

        debug!(epoch, error, best_error = previous_error, ?action, "epoch finished");

        running = config.report(EpochStats {
            epoch,
            max_iterations: settings.max_iterations,
            error,
            best_error: previous_error,
            action,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        });

        if action == CheckpointAction::Converged {
            break;
        }
    }

    // ── Final correction ──────────────────────────────────────────────────
    let final_error = if error < previous_error {
        network.save();
        error
    } else if error > previous_error {
        network.restore();
        previous_error
    } else {
        error
    };

    info!(
        epochs = epoch,
        error = final_error,
        converged = final_error <= settings.target_error,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "training finished"
    );

    Ok(final_error)
}
