use super::{Cache, Propagate};
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Maxout: at every (x, y) position, each run of `group_size` consecutive
/// depth slices collapses to its maximum.
#[derive(Debug, Clone)]
pub struct MaxoutLayer {
    in_shape: Shape,
    group_size: usize,
}

impl MaxoutLayer {
    /// `group_size` must be non-zero and divide `in_shape.depth`.
    pub fn new(in_shape: Shape, group_size: usize) -> MaxoutLayer {
        MaxoutLayer { in_shape, group_size }
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }
}

impl Propagate for MaxoutLayer {
    fn out_shape(&self) -> Shape {
        Shape::new(self.in_shape.sx, self.in_shape.sy, self.in_shape.depth / self.group_size)
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        let out_shape = self.out_shape();
        let mut out = Vol::zeros(out_shape);
        // Iterating y, x, depth in this order visits output elements in
        // storage order, so switches[k] belongs to out.w()[k].
        let mut switches = Vec::with_capacity(out_shape.len());
        for y in 0..out_shape.sy {
            for x in 0..out_shape.sx {
                for i in 0..out_shape.depth {
                    let base = i * self.group_size;
                    let mut best = base;
                    let mut a = input.get(x, y, base);
                    for d in base + 1..base + self.group_size {
                        let v = input.get(x, y, d);
                        if v > a {
                            a = v;
                            best = d;
                        }
                    }
                    out.set(x, y, i, a);
                    switches.push(((y * self.in_shape.sx) + x) * self.in_shape.depth + best);
                }
            }
        }
        (out, Cache::Switches(switches))
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, cache: &Cache) {
        if let Cache::Switches(switches) = cache {
            let dx = input.dw_mut();
            for (k, &s) in switches.iter().enumerate() {
                dx[s] += output.dw()[k];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_group_maxima() {
        let l = MaxoutLayer::new(Shape::flat(6), 3);
        let x = Vol::from_vec(vec![0.1, 0.9, -0.2, 0.4, 0.3, 0.5]);
        let (y, cache) = l.forward(&x, &mut Mode::Inference);
        assert_eq!(y.w(), &[0.9, 0.5]);
        assert_eq!(cache, Cache::Switches(vec![1, 5]));
    }

    #[test]
    fn routes_gradient_to_winners_on_volumes() {
        let shape = Shape::new(2, 1, 4);
        let mut l = MaxoutLayer::new(shape, 2);
        let x = Vol::from_parts(shape, vec![0.1, 0.9, -0.2, 0.4, 0.3, 0.5, 0.8, -0.6]);
        assert_eq!(l.out_shape(), Shape::new(2, 1, 2));
        super::super::testutil::check_input_gradient(&mut l, &x);
    }
}
