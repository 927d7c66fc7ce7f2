use serde::{Deserialize, Serialize};

/// Per-epoch statistics returned by `train_loop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean `TrainStats::loss` over all samples in this epoch.
    pub mean_loss: f64,
    /// Fraction of samples whose argmax prediction matches their class after
    /// the epoch; only set when every target is `LossData::Class`.
    pub accuracy: Option<f64>,
    /// Wall-clock duration of this epoch in milliseconds.
    pub elapsed_ms: u64,
}
