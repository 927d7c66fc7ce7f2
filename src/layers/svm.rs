use super::{class_target, pass_through, Cache, Objective, Propagate};
use crate::error::Result;
use crate::loss::hinge::HingeLoss;
use crate::loss::loss_data::LossData;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Multiclass SVM loss layer; its output is the raw score vector.
#[derive(Debug, Clone)]
pub struct SvmLayer {
    num_classes: usize,
}

impl SvmLayer {
    pub fn new(in_shape: Shape) -> SvmLayer {
        SvmLayer { num_classes: in_shape.len() }
    }
}

impl Propagate for SvmLayer {
    fn out_shape(&self) -> Shape {
        Shape::flat(self.num_classes)
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        (pass_through(input, self.out_shape()), Cache::None)
    }

    fn backward(&mut self, _input: &mut Vol, _output: &Vol, _cache: &Cache) {}
}

impl Objective for SvmLayer {
    fn cost(&self, output: &Vol, target: &LossData) -> Result<f64> {
        let class = class_target("svm", target, self.num_classes)?;
        Ok(HingeLoss::loss(output.w(), class))
    }

    fn seed_gradient(&self, input: &mut Vol, output: &Vol, target: &LossData) -> Result<f64> {
        let class = class_target("svm", target, self.num_classes)?;
        Ok(HingeLoss::accumulate_gradient(output.w(), class, input.dw_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scores_pass_through_and_margin_violations_seed_gradient() {
        let l = SvmLayer::new(Shape::flat(3));
        let mut x = Vol::from_vec(vec![0.2, 0.9, 0.0]);
        let (y, _) = l.forward(&x, &mut Mode::Inference);
        assert_eq!(y.w(), x.w());

        let loss = l.seed_gradient(&mut x, &y, &LossData::Class(0)).unwrap();
        // 0.9 - 0.2 + 1 and 0.0 - 0.2 + 1 both violate the margin
        assert!((loss - 2.5).abs() < 1e-12);
        assert_eq!(x.dw(), &[-2.0, 1.0, 1.0]);
        assert_eq!(l.cost(&y, &LossData::Class(0)).unwrap(), loss);
    }

    #[test]
    fn satisfied_margins_cost_nothing() {
        let l = SvmLayer::new(Shape::flat(2));
        let y = Vol::from_vec(vec![3.0, 0.5]);
        assert_eq!(l.cost(&y, &LossData::Class(0)).unwrap(), 0.0);
        assert!(l.cost(&y, &LossData::Class(2)).is_err());
    }
}
