use serde::{Deserialize, Serialize};

use crate::error::{NetError, Result};
use crate::optim::method::{Hyper, Method};

/// Optimizer configuration, fixed for the lifetime of a `Trainer`.
///
/// # Fields
/// - `learning_rate`: step size
/// - `momentum`: in [0, 1); used by `Sgd` and `Nesterov`
/// - `batch_size`: gradients accumulate over this many `train` calls
///   before one update; `1` updates on every call
/// - `l1_decay` / `l2_decay`: weight decay, scaled per parameter tensor
/// - `method`: update rule
/// - `ro`: window decay for `Windowgrad` and `Adadelta`
/// - `eps`: denominator guard for the adaptive methods
/// - `beta1` / `beta2`: Adam moment decays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerOptions {
    pub learning_rate: f64,
    pub momentum: f64,
    pub batch_size: usize,
    pub l1_decay: f64,
    pub l2_decay: f64,
    pub method: Method,
    pub ro: f64,
    pub eps: f64,
    pub beta1: f64,
    pub beta2: f64,
}

impl Default for TrainerOptions {
    fn default() -> Self {
        TrainerOptions {
            learning_rate: 0.01,
            momentum: 0.9,
            batch_size: 1,
            l1_decay: 0.0,
            l2_decay: 0.0,
            method: Method::Sgd,
            ro: 0.95,
            eps: 1e-8,
            beta1: 0.9,
            beta2: 0.999,
        }
    }
}

impl TrainerOptions {
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn l1_decay(mut self, l1_decay: f64) -> Self {
        self.l1_decay = l1_decay;
        self
    }

    pub fn l2_decay(mut self, l2_decay: f64) -> Self {
        self.l2_decay = l2_decay;
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Checks every option against its valid range.
    pub fn validate(&self) -> Result<()> {
        fn invalid(name: &'static str, reason: String) -> Result<()> {
            Err(NetError::InvalidOption { name, reason })
        }

        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return invalid("learning_rate", format!("{} is not a positive number", self.learning_rate));
        }
        if !(0.0..1.0).contains(&self.momentum) {
            return invalid("momentum", format!("{} is outside [0, 1)", self.momentum));
        }
        if self.batch_size == 0 {
            return invalid("batch_size", "must be at least 1".to_string());
        }
        if !non_negative(self.l1_decay) {
            return invalid("l1_decay", format!("{} is not a non-negative number", self.l1_decay));
        }
        if !non_negative(self.l2_decay) {
            return invalid("l2_decay", format!("{} is not a non-negative number", self.l2_decay));
        }
        if !open_unit(self.ro) {
            return invalid("ro", format!("{} is outside (0, 1)", self.ro));
        }
        if self.eps.is_nan() || self.eps <= 0.0 {
            return invalid("eps", format!("{} is not positive", self.eps));
        }
        if !(0.0..1.0).contains(&self.beta1) {
            return invalid("beta1", format!("{} is outside [0, 1)", self.beta1));
        }
        if !(0.0..1.0).contains(&self.beta2) {
            return invalid("beta2", format!("{} is outside [0, 1)", self.beta2));
        }
        Ok(())
    }

    pub(crate) fn hyper(&self) -> Hyper {
        Hyper {
            learning_rate: self.learning_rate,
            momentum: self.momentum,
            ro: self.ro,
            eps: self.eps,
            beta1: self.beta1,
            beta2: self.beta2,
        }
    }
}

/// False for NaN as well as for negative values.
fn non_negative(v: f64) -> bool {
    !v.is_nan() && v >= 0.0
}

/// Strictly inside (0, 1); false for NaN.
fn open_unit(v: f64) -> bool {
    v > 0.0 && v < 1.0
}
