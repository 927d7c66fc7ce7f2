use super::{accumulate_identity, pass_through, Cache, Propagate};
use crate::math::vol::{Shape, Vol};
use crate::network::pass::Mode;

/// Entry point of a network; fixes the expected input shape and passes the
/// volume through unchanged.
#[derive(Debug, Clone)]
pub struct InputLayer {
    shape: Shape,
}

impl InputLayer {
    pub fn new(shape: Shape) -> InputLayer {
        InputLayer { shape }
    }
}

impl Propagate for InputLayer {
    fn out_shape(&self) -> Shape {
        self.shape
    }

    fn forward(&self, input: &Vol, _mode: &mut Mode<'_>) -> (Vol, Cache) {
        assert_eq!(
            input.shape(),
            self.shape,
            "input volume shape does not match the network's input layer"
        );
        (pass_through(input, self.shape), Cache::None)
    }

    fn backward(&mut self, input: &mut Vol, output: &Vol, _cache: &Cache) {
        accumulate_identity(input, output);
    }
}
