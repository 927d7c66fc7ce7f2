pub mod dropout;
pub mod fully_conn;
pub mod input;
pub mod maxout;
pub mod nonlinear;
pub mod regression;
pub mod softmax;
pub mod svm;

pub use dropout::DropoutLayer;
pub use fully_conn::FullyConnLayer;
pub use input::InputLayer;
pub use maxout::MaxoutLayer;
pub use nonlinear::ActivationLayer;
pub use regression::RegressionLayer;
pub use softmax::SoftmaxLayer;
pub use svm::SvmLayer;

use crate::error::{NetError, Result};
use crate::loss::loss_data::LossData;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Per-pass scratch a layer needs to replay its forward computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cache {
    None,
    /// Dropout: `true` where the activation was dropped.
    Mask(Vec<bool>),
    /// Maxout: flat input index of the winner for each output element.
    Switches(Vec<usize>),
}

/// One trainable parameter tensor, borrowed for an optimizer step, with the
/// multipliers applied to the trainer's decay for it.
#[derive(Debug)]
pub struct ParamGroup<'a> {
    pub values: &'a mut [f64],
    pub grads: &'a mut [f64],
    pub l1_decay_mul: f64,
    pub l2_decay_mul: f64,
}

/// Forward/backward contract every primitive layer implements.
pub trait Propagate {
    fn out_shape(&self) -> Shape;

    /// Computes this layer's output from `input` without modifying it.
    fn forward(&self, input: &Vol, mode: &mut Mode<'_>) -> (Vol, Cache);

    /// Reads `output.dw` and accumulates into `input.dw` and into this
    /// layer's parameter gradients. Never overwrites.
    fn backward(&mut self, input: &mut Vol, output: &Vol, cache: &Cache);

    fn params(&self) -> Vec<&Vol> {
        Vec::new()
    }

    fn params_and_grads(&mut self) -> Vec<ParamGroup<'_>> {
        Vec::new()
    }
}

/// Terminal layers that turn their output into a scalar loss.
pub trait Objective {
    /// Loss of `output` against `target`; touches no gradient.
    fn cost(&self, output: &Vol, target: &LossData) -> Result<f64>;

    /// Accumulates ∂loss/∂input into `input.dw` and returns the loss.
    fn seed_gradient(&self, input: &mut Vol, output: &Vol, target: &LossData) -> Result<f64>;
}

/// A primitive layer of a `Net`.
#[derive(Debug, Clone)]
pub enum Layer {
    Input(InputLayer),
    FullyConn(FullyConnLayer),
    Activation(ActivationLayer),
    Maxout(MaxoutLayer),
    Dropout(DropoutLayer),
    Softmax(SoftmaxLayer),
    Svm(SvmLayer),
    Regression(RegressionLayer),
}

impl Layer {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Input(_) => "input",
            Layer::FullyConn(_) => "fc",
            Layer::Activation(l) => l.function().name(),
            Layer::Maxout(_) => "maxout",
            Layer::Dropout(_) => "dropout",
            Layer::Softmax(_) => "softmax",
            Layer::Svm(_) => "svm",
            Layer::Regression(_) => "regression",
        }
    }

    fn inner(&self) -> &dyn Propagate {
        match self {
            Layer::Input(l) => l,
            Layer::FullyConn(l) => l,
            Layer::Activation(l) => l,
            Layer::Maxout(l) => l,
            Layer::Dropout(l) => l,
            Layer::Softmax(l) => l,
            Layer::Svm(l) => l,
            Layer::Regression(l) => l,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Propagate {
        match self {
            Layer::Input(l) => l,
            Layer::FullyConn(l) => l,
            Layer::Activation(l) => l,
            Layer::Maxout(l) => l,
            Layer::Dropout(l) => l,
            Layer::Softmax(l) => l,
            Layer::Svm(l) => l,
            Layer::Regression(l) => l,
        }
    }

    /// The loss computation, for terminal loss layers.
    pub fn objective(&self) -> Option<&dyn Objective> {
        match self {
            Layer::Softmax(l) => Some(l),
            Layer::Svm(l) => Some(l),
            Layer::Regression(l) => Some(l),
            _ => None,
        }
    }
}

impl Propagate for Layer {
    fn out_shape(&self) -> Shape {
        self.inner().out_shape()
    }

    fn forward(&self, input: &Vol, mode: &mut Mode<'_>) -> (Vol, Cache) {
        self.inner().forward(input, mode)
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, cache: &Cache) {
        self.inner_mut().backward(input, output, cache)
    }

    fn params(&self) -> Vec<&Vol> {
        self.inner().params()
    }

    fn params_and_grads(&mut self) -> Vec<ParamGroup<'_>> {
        self.inner_mut().params_and_grads()
    }
}

/// Extracts a class index and checks it against `classes`.
pub(crate) fn class_target(layer: &'static str, target: &LossData, classes: usize) -> Result<usize> {
    match target {
        LossData::Class(class) if *class < classes => Ok(*class),
        LossData::Class(class) => Err(NetError::ClassOutOfRange { class: *class, classes }),
        _ => Err(NetError::LossMismatch { layer, expected: "class" }),
    }
}

/// Copies `input` into a fresh volume of shape `shape` with zeroed gradients.
pub(crate) fn pass_through(input: &Vol, shape: Shape) -> Vol {
    Vol::from_parts(shape, input.w().to_vec())
}

/// Adds `output.dw` element-wise into `input.dw`.
pub(crate) fn accumulate_identity(input: &mut Vol, output: &Vol) {
    for (dx, dy) in input.dw_mut().iter_mut().zip(output.dw()) {
        *dx += dy;
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use approx::assert_relative_eq;

    /// Projects the output onto fixed weights `r` so L = Σ r·y, then checks
    /// the analytic ∂L/∂x against centered differences.
    pub fn check_input_gradient(layer: &mut dyn Propagate, input: &Vol) {
        let (output, cache) = layer.forward(input, &mut Mode::Inference);
        let r: Vec<f64> = (0..output.len()).map(|i| 0.3 + 0.17 * i as f64).collect();
        let mut seeded = output.clone();
        seeded.dw_mut().copy_from_slice(&r);

        let mut x = input.clone();
        layer.backward(&mut x, &seeded, &cache);

        let h = 1e-6;
        for i in 0..x.len() {
            let mut plus = input.clone();
            plus.w_mut()[i] += h;
            let mut minus = input.clone();
            minus.w_mut()[i] -= h;
            let project = |v: &Vol| -> f64 {
                let (y, _) = layer.forward(v, &mut Mode::Inference);
                y.w().iter().zip(&r).map(|(a, b)| a * b).sum()
            };
            let numeric = (project(&plus) - project(&minus)) / (2.0 * h);
            assert_relative_eq!(x.dw()[i], numeric, epsilon = 1e-6, max_relative = 1e-4);
        }
    }
}
