use serde::{Serialize, Deserialize};

/// What the training loop did with the weights at the end of an epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointAction {
    /// First epoch: its result is stored as the reference state.
    Baseline,
    /// Error reached `target_error`; the loop stops.
    Converged,
    /// Error improved enough to store a new checkpoint.
    Commit,
    /// Error regressed past the restore threshold; weights were rolled back.
    Rollback,
    /// Neither threshold crossed; weights are kept without checkpointing.
    Hold,
}

/// Per-epoch statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` value at the end of every completed epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: u32,
    /// Upper bound on epochs for this run.
    pub max_iterations: u32,
    /// Mean error measured after this epoch's updates.
    pub error: f64,
    /// Error of the last committed checkpoint, after this epoch's action.
    pub best_error: f64,
    pub action: CheckpointAction,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}
