use super::{class_target, Cache, Objective, Propagate};
use crate::error::Result;
use crate::loss::cross_entropy::CrossEntropyLoss;
use crate::loss::loss_data::LossData;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Softmax over the flattened input, trained with cross-entropy.
#[derive(Debug, Clone)]
pub struct SoftmaxLayer {
    num_classes: usize,
}

impl SoftmaxLayer {
    pub fn new(in_shape: Shape) -> SoftmaxLayer {
        SoftmaxLayer { num_classes: in_shape.len() }
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

/// Numerically stable softmax: the maximum is subtracted before exponentiating.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl Propagate for SoftmaxLayer {
    fn out_shape(&self) -> Shape {
        Shape::flat(self.num_classes)
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        (Vol::from_parts(self.out_shape(), softmax(input.w())), Cache::None)
    }

    /// The input gradient is seeded by `Objective::seed_gradient`.
    fn backward(&mut self, _input: &mut Vol, _output: &Vol, _cache: &Cache) {}
}

impl Objective for SoftmaxLayer {
    fn cost(&self, output: &Vol, target: &LossData) -> Result<f64> {
        let class = class_target("softmax", target, self.num_classes)?;
        Ok(CrossEntropyLoss::loss(output.w(), class))
    }

    fn seed_gradient(&self, input: &mut Vol, output: &Vol, target: &LossData) -> Result<f64> {
        let class = class_target("softmax", target, self.num_classes)?;
        CrossEntropyLoss::accumulate_gradient(output.w(), class, input.dw_mut());
        Ok(CrossEntropyLoss::loss(output.w(), class))
    }
}
