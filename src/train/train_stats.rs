use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What one `Trainer::train` call did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    pub fwd_time: Duration,
    pub bwd_time: Duration,
    /// Loss reported by the terminal loss layer.
    pub cost_loss: f64,
    /// Σ l1·|w| over decayed weights; zero on steps that did not update.
    pub l1_decay_loss: f64,
    /// Σ l2·w²/2 over decayed weights; zero on steps that did not update.
    pub l2_decay_loss: f64,
    /// `cost_loss + l1_decay_loss + l2_decay_loss`.
    pub loss: f64,
    /// Whether this call completed a batch and applied an update.
    pub updated: bool,
}
