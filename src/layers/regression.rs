use super::{pass_through, Cache, Objective, Propagate};
use crate::error::{NetError, Result};
use crate::loss::loss_data::LossData;
use crate::loss::squared::HalfSquaredLoss;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Regression loss layer: identity forward, half squared error against a
/// target vector or a single target component.
#[derive(Debug, Clone)]
pub struct RegressionLayer {
    num_outputs: usize,
}

impl RegressionLayer {
    pub fn new(in_shape: Shape) -> RegressionLayer {
        RegressionLayer { num_outputs: in_shape.len() }
    }

    /// (dimension, target) pairs the loss is taken over.
    fn targets(&self, target: &LossData) -> Result<Vec<(usize, f64)>> {
        match target {
            LossData::Target(values) if values.len() == self.num_outputs => {
                Ok(values.iter().copied().enumerate().collect())
            }
            LossData::Target(values) => Err(NetError::TargetLength {
                expected: self.num_outputs,
                found: values.len(),
            }),
            LossData::Component { dim, value } if *dim < self.num_outputs => Ok(vec![(*dim, *value)]),
            LossData::Component { dim, .. } => Err(NetError::DimOutOfRange {
                dim: *dim,
                len: self.num_outputs,
            }),
            LossData::Class(_) => Err(NetError::LossMismatch {
                layer: "regression",
                expected: "target or component",
            }),
        }
    }
}

impl Propagate for RegressionLayer {
    fn out_shape(&self) -> Shape {
        Shape::flat(self.num_outputs)
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        (pass_through(input, self.out_shape()), Cache::None)
    }

    fn backward(&mut self, _input: &mut Vol, _output: &Vol, _cache: &Cache) {}
}

impl Objective for RegressionLayer {
    fn cost(&self, output: &Vol, target: &LossData) -> Result<f64> {
        Ok(self.targets(target)?
            .into_iter()
            .map(|(d, y)| HalfSquaredLoss::loss(output.w()[d], y))
            .sum())
    }

    fn seed_gradient(&self, input: &mut Vol, output: &Vol, target: &LossData) -> Result<f64> {
        let mut loss = 0.0;
        for (d, y) in self.targets(target)? {
            let p = output.w()[d];
            input.dw_mut()[d] += HalfSquaredLoss::derivative(p, y);
            loss += HalfSquaredLoss::loss(p, y);
        }
        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn component_target_only_touches_one_output() {
        let l = RegressionLayer::new(Shape::flat(3));
        let mut x = Vol::from_vec(vec![1.0, 2.0, 3.0]);
        let (y, _) = l.forward(&x, &mut Mode::Inference);
        let loss = l
            .seed_gradient(&mut x, &y, &LossData::Component { dim: 1, value: 0.5 })
            .unwrap();
        assert_relative_eq!(loss, 0.5 * 1.5 * 1.5);
        assert_eq!(x.dw(), &[0.0, 1.5, 0.0]);
    }

    #[test]
    fn full_target_checks_length() {
        let l = RegressionLayer::new(Shape::flat(2));
        let y = Vol::from_vec(vec![1.0, -1.0]);
        assert_relative_eq!(l.cost(&y, &LossData::Target(vec![0.0, 0.0])).unwrap(), 1.0);
        assert_eq!(
            l.cost(&y, &LossData::Target(vec![0.0])),
            Err(NetError::TargetLength { expected: 2, found: 1 })
        );
        assert_eq!(
            l.cost(&y, &LossData::Component { dim: 2, value: 0.0 }),
            Err(NetError::DimOutOfRange { dim: 2, len: 2 })
        );
    }
}
