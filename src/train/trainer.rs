use std::time::Instant;

use crate::error::Result;
use crate::loss::loss_data::LossData;
use crate::math::vol::Vol;
use crate::network::net::Net;
use crate::optim::method::ParamState;
use crate::train::train_stats::TrainStats;
use crate::train::trainer_options::TrainerOptions;

/// Drives a `Net` with one of the SGD-family update rules.
///
/// The trainer owns the net so optimizer state always lines up with the
/// parameters it was built for; use [`Trainer::net`] / [`Trainer::net_mut`]
/// to run inference between steps.
#[derive(Debug, Clone)]
pub struct Trainer {
    net: Net,
    options: TrainerOptions,
    /// One entry per parameter tensor, in `Net::params_and_grads` order.
    /// Allocated on the first update.
    state: Vec<ParamState>,
    /// `train` calls so far.
    calls: u64,
    /// Updates applied so far.
    updates: u64,
}

impl Trainer {
    pub fn new(net: Net, options: TrainerOptions) -> Result<Trainer> {
        options.validate()?;
        log::debug!(
            "trainer: {:?}, lr {}, momentum {}, batch {}, l1 {}, l2 {}",
            options.method,
            options.learning_rate,
            options.momentum,
            options.batch_size,
            options.l1_decay,
            options.l2_decay
        );
        Ok(Trainer {
            net,
            options,
            state: Vec::new(),
            calls: 0,
            updates: 0,
        })
    }

    pub fn net(&self) -> &Net {
        &self.net
    }

    pub fn net_mut(&mut self) -> &mut Net {
        &mut self.net
    }

    pub fn into_net(self) -> Net {
        self.net
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// Number of updates applied so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// One training step on a single example.
    ///
    /// Runs a training-mode forward pass, backpropagates `target`, and, once
    /// every `batch_size` calls, updates every parameter with
    /// `g = grad / batch_size + l2·w + l1·sign(w)` (decays scaled per tensor)
    /// before zeroing its gradient. Leaves ∂loss/∂x in `x.dw`.
    pub fn train(&mut self, x: &mut Vol, target: &LossData) -> Result<TrainStats> {
        let start = Instant::now();
        let mut pass = self.net.forward_pass(x, true);
        let fwd_time = start.elapsed();

        let start = Instant::now();
        let cost_loss = self.net.backward(x, &mut pass, target)?;
        let bwd_time = start.elapsed();

        self.calls += 1;
        let updated = self.calls % self.options.batch_size as u64 == 0;
        let (l1_decay_loss, l2_decay_loss) = if updated { self.update() } else { (0.0, 0.0) };

        let loss = cost_loss + l1_decay_loss + l2_decay_loss;
        if !loss.is_finite() {
            log::warn!("step {}: non-finite loss {}", self.calls, loss);
        }
        log::trace!("step {}: cost {:.6}, updated {}", self.calls, cost_loss, updated);

        Ok(TrainStats {
            fwd_time,
            bwd_time,
            cost_loss,
            l1_decay_loss,
            l2_decay_loss,
            loss,
            updated,
        })
    }

    /// Applies one update to every parameter and zeroes its gradient.
    /// Returns the (l1, l2) decay losses measured before the update.
    fn update(&mut self) -> (f64, f64) {
        self.updates += 1;
        let t = self.updates;
        let hp = self.options.hyper();
        let opts = &self.options;
        let batch = opts.batch_size as f64;

        let mut groups = self.net.params_and_grads();
        if self.state.len() != groups.len() {
            self.state = groups.iter().map(|g| ParamState::zeros(g.values.len())).collect();
        }

        let mut l1_decay_loss = 0.0;
        let mut l2_decay_loss = 0.0;
        for (group, state) in groups.iter_mut().zip(self.state.iter_mut()) {
            let l1 = opts.l1_decay * group.l1_decay_mul;
            let l2 = opts.l2_decay * group.l2_decay_mul;
            for j in 0..group.values.len() {
                let w = group.values[j];
                l1_decay_loss += l1 * w.abs();
                l2_decay_loss += l2 * w * w / 2.0;

                let g = group.grads[j] / batch + l2 * w + l1 * sign(w);
                let dx = opts.method.delta(&hp, t, g, &mut state.gsum[j], &mut state.xsum[j]);
                group.values[j] += dx;
                group.grads[j] = 0.0;
            }
        }

        (l1_decay_loss, l2_decay_loss)
    }
}

fn sign(w: f64) -> f64 {
    if w > 0.0 {
        1.0
    } else if w < 0.0 {
        -1.0
    } else {
        0.0
    }
}
