use serde::{Deserialize, Serialize};

/// Update rule applied to every trainable scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Plain SGD, with classical momentum when `momentum > 0`.
    #[default]
    Sgd,
    /// Nesterov accelerated gradient.
    Nesterov,
    Adagrad,
    /// Adagrad over an exponentially decaying window (`ro`).
    Windowgrad,
    Adadelta,
    /// Adam with bias correction.
    Adam,
}

/// Hyper-parameters an update rule reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hyper {
    pub learning_rate: f64,
    pub momentum: f64,
    pub ro: f64,
    pub eps: f64,
    pub beta1: f64,
    pub beta2: f64,
}

/// Two accumulators per trainable scalar of one parameter tensor. Their
/// meaning depends on the method: velocity, squared-gradient sums, or Adam's
/// first and second moments.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamState {
    pub gsum: Vec<f64>,
    pub xsum: Vec<f64>,
}

impl ParamState {
    pub fn zeros(len: usize) -> ParamState {
        ParamState {
            gsum: vec![0.0; len],
            xsum: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.gsum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gsum.is_empty()
    }
}

impl Method {
    /// Returns the step to add to a parameter whose (decayed, batch-averaged)
    /// gradient is `g`. `t` is the 1-based update count, used by Adam.
    pub fn delta(&self, hp: &Hyper, t: u64, g: f64, gsum: &mut f64, xsum: &mut f64) -> f64 {
        match self {
            Method::Sgd => {
                if hp.momentum > 0.0 {
                    let dx = hp.momentum * *gsum - hp.learning_rate * g;
                    *gsum = dx;
                    dx
                } else {
                    -hp.learning_rate * g
                }
            }
            Method::Nesterov => {
                let prev = *gsum;
                *gsum = hp.momentum * *gsum + hp.learning_rate * g;
                hp.momentum * prev - (1.0 + hp.momentum) * *gsum
            }
            Method::Adagrad => {
                *gsum += g * g;
                -hp.learning_rate / (*gsum + hp.eps).sqrt() * g
            }
            Method::Windowgrad => {
                *gsum = hp.ro * *gsum + (1.0 - hp.ro) * g * g;
                -hp.learning_rate / (*gsum + hp.eps).sqrt() * g
            }
            Method::Adadelta => {
                *gsum = hp.ro * *gsum + (1.0 - hp.ro) * g * g;
                let dx = -((*xsum + hp.eps) / (*gsum + hp.eps)).sqrt() * g;
                *xsum = hp.ro * *xsum + (1.0 - hp.ro) * dx * dx;
                dx
            }
            Method::Adam => {
                *gsum = hp.beta1 * *gsum + (1.0 - hp.beta1) * g;
                *xsum = hp.beta2 * *xsum + (1.0 - hp.beta2) * g * g;
                let t = t.min(i32::MAX as u64) as i32;
                let m_hat = *gsum / (1.0 - hp.beta1.powi(t));
                let v_hat = *xsum / (1.0 - hp.beta2.powi(t));
                -hp.learning_rate * m_hat / (v_hat.sqrt() + hp.eps)
            }
        }
    }
}
