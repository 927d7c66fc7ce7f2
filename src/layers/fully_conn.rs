use rand::Rng;

use super::{Cache, ParamGroup, Propagate};
use crate::math::init::WeightInit;
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Fully-connected layer: `y_i = b_i + Σ_d w_id · x_d` over the flattened
/// input, producing a 1×1×`out_depth` volume.
#[derive(Debug, Clone)]
pub struct FullyConnLayer {
    in_shape: Shape,
    /// One 1×1×num_inputs filter per output neuron.
    filters: Vec<Vol>,
    biases: Vol,
    l1_decay_mul: f64,
    l2_decay_mul: f64,
}

impl FullyConnLayer {
    pub fn new<R: Rng + ?Sized>(
        in_shape: Shape,
        out_depth: usize,
        bias_pref: f64,
        init: WeightInit,
        rng: &mut R,
    ) -> FullyConnLayer {
        let num_inputs = in_shape.len();
        let filters = (0..out_depth)
            .map(|_| {
                let mut f = Vol::zeros(Shape::flat(num_inputs));
                init.fill(f.w_mut(), num_inputs, rng);
                f
            })
            .collect();

        FullyConnLayer {
            in_shape,
            filters,
            biases: Vol::filled(Shape::flat(out_depth), bias_pref),
            l1_decay_mul: 0.0,
            l2_decay_mul: 1.0,
        }
    }

    pub fn with_decay(mut self, l1_decay_mul: f64, l2_decay_mul: f64) -> FullyConnLayer {
        self.l1_decay_mul = l1_decay_mul;
        self.l2_decay_mul = l2_decay_mul;
        self
    }

    pub fn filters(&self) -> &[Vol] {
        &self.filters
    }

    pub fn biases(&self) -> &Vol {
        &self.biases
    }

    pub fn num_inputs(&self) -> usize {
        self.in_shape.len()
    }
}

impl Propagate for FullyConnLayer {
    fn out_shape(&self) -> Shape {
        Shape::flat(self.filters.len())
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        let mut out = Vol::zeros(self.out_shape());
        for (i, (a, filter)) in out.w_mut().iter_mut().zip(&self.filters).enumerate() {
            let dot: f64 = filter.w().iter().zip(input.w()).map(|(w, x)| w * x).sum();
            *a = dot + self.biases.w()[i];
        }
        (out, Cache::None)
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, _cache: &Cache) {
        let (x, dx) = input.split_mut();
        for (i, filter) in self.filters.iter_mut().enumerate() {
            let chain = output.dw()[i];
            let (w, dw) = filter.split_mut();
            for d in 0..x.len() {
                dx[d] += w[d] * chain;
                dw[d] += x[d] * chain;
            }
            self.biases.dw_mut()[i] += chain;
        }
    }

    fn params(&self) -> Vec<&Vol> {
        self.filters.iter().chain(std::iter::once(&self.biases)).collect()
    }

    fn params_and_grads(&mut self) -> Vec<ParamGroup<'_>> {
        let (l1, l2) = (self.l1_decay_mul, self.l2_decay_mul);
        let mut groups: Vec<ParamGroup<'_>> = self
            .filters
            .iter_mut()
            .map(|f| {
                let (values, grads) = f.split_mut();
                ParamGroup { values, grads, l1_decay_mul: l1, l2_decay_mul: l2 }
            })
            .collect();
        // Biases are never decayed.
        let (values, grads) = self.biases.split_mut();
        groups.push(ParamGroup { values, grads, l1_decay_mul: 0.0, l2_decay_mul: 0.0 });
        groups
    }
}
