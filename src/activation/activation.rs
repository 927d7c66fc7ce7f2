use serde::{Deserialize, Serialize};
use std::f64::consts::E;

/// Nonlinearity attached to a fully-connected definition or used as a
/// standalone layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu { alpha: f64 },
    Elu { alpha: f64 },
    /// Maxout pools across depth instead of acting element-wise, so it is
    /// built into a `MaxoutLayer` and never reaches `function()`/`derivative()`.
    Maxout {
        #[serde(default = "default_group_size")]
        group_size: usize,
    },
}

fn default_group_size() -> usize {
    2
}

impl ActivationFunction {
    /// Element-wise activation.
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Relu => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::LeakyRelu { alpha } => if x > 0.0 { x } else { alpha * x },
            ActivationFunction::Elu { alpha } => {
                if x > 0.0 { x } else { alpha * (E.powf(x) - 1.0) }
            }
            ActivationFunction::Maxout { .. } => {
                panic!("ActivationFunction::Maxout::function() must not be called; \
                        maxout is applied across depth by MaxoutLayer.")
            }
        }
    }

    /// Local derivative dy/dx, given both the input `x` and the cached output
    /// `y = function(x)`. Sigmoid and tanh read it off `y` so no
    /// transcendental is re-evaluated on the backward pass.
    pub fn derivative(&self, x: f64, y: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => y * (1.0 - y),
            ActivationFunction::Tanh => 1.0 - y * y,
            ActivationFunction::Relu => if y > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::LeakyRelu { alpha } => if x > 0.0 { 1.0 } else { *alpha },
            ActivationFunction::Elu { alpha } => if x > 0.0 { 1.0 } else { y + alpha },
            ActivationFunction::Maxout { .. } => {
                panic!("ActivationFunction::Maxout::derivative() must not be called; \
                        maxout is applied across depth by MaxoutLayer.")
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Relu => "relu",
            ActivationFunction::LeakyRelu { .. } => "leaky_relu",
            ActivationFunction::Elu { .. } => "elu",
            ActivationFunction::Maxout { .. } => "maxout",
        }
    }
}
