use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::Result;
use crate::loss::loss_data::LossData;
use crate::math::vol::Vol;
use crate::train::epoch_stats::EpochStats;
use crate::train::trainer::Trainer;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains for `epochs` passes over `inputs`/`targets` and returns one
/// `EpochStats` per epoch.
///
/// Sample order is reshuffled every epoch from `rng`, so a seeded `rng` gives
/// a reproducible run. Each sample is one `Trainer::train` call; the
/// trainer's `batch_size` decides how often parameters move. Input gradients
/// are left in each `inputs[i].dw` from its latest step.
///
/// # Panics
/// Panics if `inputs` is empty or `inputs` and `targets` differ in length.
pub fn train_loop<R: Rng + ?Sized>(
    trainer: &mut Trainer,
    inputs: &mut [Vol],
    targets: &[LossData],
    epochs: usize,
    rng: &mut R,
) -> Result<Vec<EpochStats>> {
    assert!(!inputs.is_empty(), "inputs must not be empty");
    assert_eq!(
        inputs.len(),
        targets.len(),
        "inputs and targets must have equal length"
    );

    let classification = targets.iter().all(|t| t.as_class().is_some());
    let mut indices: Vec<usize> = (0..inputs.len()).collect();
    let mut history = Vec::with_capacity(epochs);

    for epoch in 1..=epochs {
        let t_start = Instant::now();

        indices.shuffle(rng);
        let mut total_loss = 0.0;
        for &idx in &indices {
            total_loss += trainer.train(&mut inputs[idx], &targets[idx])?.loss;
        }
        let mean_loss = total_loss / inputs.len() as f64;

        let accuracy = if classification {
            Some(compute_accuracy(trainer, inputs, targets))
        } else {
            None
        };

        let stats = EpochStats {
            epoch,
            total_epochs: epochs,
            mean_loss,
            accuracy,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        log::info!(
            "epoch {}/{}: loss {:.6}{}",
            epoch,
            epochs,
            mean_loss,
            accuracy.map(|a| format!(", accuracy {:.2}%", a * 100.0)).unwrap_or_default()
        );
        history.push(stats);
    }

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Fraction of samples classified correctly (argmax match).
fn compute_accuracy(trainer: &Trainer, inputs: &[Vol], targets: &[LossData]) -> f64 {
    let correct = inputs.iter().zip(targets)
        .filter(|(x, t)| t.as_class() == Some(trainer.net().predict_class(x)))
        .count();
    correct as f64 / inputs.len() as f64
}
