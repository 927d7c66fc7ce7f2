use super::{Cache, Propagate};
use crate::activation::activation::ActivationFunction;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Element-wise nonlinearity; output has the input's shape.
#[derive(Debug, Clone)]
pub struct ActivationLayer {
    shape: Shape,
    function: ActivationFunction,
}

impl ActivationLayer {
    /// `function` must be element-wise; maxout is built as a `MaxoutLayer`.
    pub fn new(shape: Shape, function: ActivationFunction) -> ActivationLayer {
        debug_assert!(!matches!(function, ActivationFunction::Maxout { .. }));
        ActivationLayer { shape, function }
    }

    pub fn function(&self) -> ActivationFunction {
        self.function
    }
}

impl Propagate for ActivationLayer {
    fn out_shape(&self) -> Shape {
        self.shape
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        let values = input.w().iter().map(|&x| self.function.function(x)).collect();
        (Vol::from_parts(self.shape, values), Cache::None)
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, _cache: &Cache) {
        let (x, dx) = input.split_mut();
        for i in 0..dx.len() {
            dx[i] += output.dw()[i] * self.function.derivative(x[i], output.w()[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tanh_backward_uses_output() {
        let mut l = ActivationLayer::new(Shape::flat(2), ActivationFunction::Tanh);
        let mut x = Vol::from_vec(vec![0.3, -0.8]);
        let (mut y, cache) = l.forward(&x, &mut Mode::Inference);
        y.dw_mut().copy_from_slice(&[1.0, 2.0]);
        l.backward(&mut x, &y, &cache);
        let t = 0.3f64.tanh();
        assert!((x.dw()[0] - (1.0 - t * t)).abs() < 1e-12);
    }

    #[test]
    fn gradients_match_numeric_on_volumes() {
        let shape = Shape::new(2, 2, 2);
        let x = Vol::from_parts(shape, vec![0.3, -0.8, 1.2, -0.1, 0.05, 0.7, -1.5, 0.9]);
        for f in [
            ActivationFunction::Sigmoid,
            ActivationFunction::Tanh,
            ActivationFunction::Relu,
            ActivationFunction::Elu { alpha: 1.0 },
        ] {
            let mut l = ActivationLayer::new(shape, f);
            super::super::testutil::check_input_gradient(&mut l, &x);
        }
    }
}
