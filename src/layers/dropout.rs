use rand::Rng;

use super::{accumulate_identity, pass_through, Cache, Propagate};
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Inverted dropout: during training each activation is zeroed with
/// probability `drop_prob` and survivors are scaled by `1 / (1 - drop_prob)`,
/// so inference is the identity.
#[derive(Debug, Clone)]
pub struct DropoutLayer {
    shape: Shape,
    drop_prob: f64,
}

impl DropoutLayer {
    /// `drop_prob` must lie in [0, 1).
    pub fn new(shape: Shape, drop_prob: f64) -> DropoutLayer {
        DropoutLayer { shape, drop_prob }
    }

    pub fn drop_prob(&self) -> f64 {
        self.drop_prob
    }

    fn keep_scale(&self) -> f64 {
        1.0 / (1.0 - self.drop_prob)
    }
}

impl Propagate for DropoutLayer {
    fn out_shape(&self) -> Shape {
        self.shape
    }

    fn forward(&self, input: &Vol, mode: &mut Mode<'_>) -> (Vol, Cache) {
        match mode {
            Mode::Inference => (pass_through(input, self.shape), Cache::None),
            Mode::Training(rng) => {
                let scale = self.keep_scale();
                let mask: Vec<bool> = (0..input.len()).map(|_| rng.gen::<f64>() < self.drop_prob).collect();
                let values = input.w().iter().zip(&mask)
                    .map(|(&x, &dropped)| if dropped { 0.0 } else { x * scale })
                    .collect();
                (Vol::from_parts(self.shape, values), Cache::Mask(mask))
            }
        }
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, cache: &Cache) {
        match cache {
            Cache::Mask(mask) => {
                let scale = self.keep_scale();
                for ((dx, dy), &dropped) in input.dw_mut().iter_mut().zip(output.dw()).zip(mask) {
                    if !dropped {
                        *dx += dy * scale;
                    }
                }
            }
            _ => accumulate_identity(input, output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn inference_is_identity() {
        let l = DropoutLayer::new(Shape::flat(4), 0.5);
        let x = Vol::from_vec(vec![1.0, 2.0, 3.0, 4.0]);
        let (y, cache) = l.forward(&x, &mut Mode::Inference);
        assert_eq!(y.w(), x.w());
        assert_eq!(cache, Cache::None);
    }

    #[test]
    fn training_masks_and_rescales() {
        let mut l = DropoutLayer::new(Shape::flat(1000), 0.25);
        let mut rng = StdRng::seed_from_u64(5);
        let mut x = Vol::filled(Shape::flat(1000), 1.0);
        let (mut y, cache) = l.forward(&x, &mut Mode::Training(&mut rng));

        let mask = match &cache {
            Cache::Mask(m) => m.clone(),
            other => panic!("expected a mask, got {other:?}"),
        };
        let dropped = mask.iter().filter(|&&d| d).count();
        assert!((200..300).contains(&dropped), "dropped {dropped}");

        y.dw_mut().iter_mut().for_each(|g| *g = 1.0);
        l.backward(&mut x, &y, &cache);
        for i in 0..1000 {
            let expected = if mask[i] { 0.0 } else { 1.0 / 0.75 };
            assert!((y.w()[i] - expected).abs() < 1e-12);
            assert!((x.dw()[i] - expected).abs() < 1e-12);
        }
    }
}
