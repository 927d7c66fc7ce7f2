use rand::rngs::StdRng;

use crate::layers::Cache;
use crate::math::vol::Vol;

/// Whether a forward pass runs training-only behaviour (dropout masking).
/// Training mode carries the random source that behaviour draws from.
pub enum Mode<'a> {
    Inference,
    Training(&'a mut StdRng),
}

impl Mode<'_> {
    pub fn is_training(&self) -> bool {
        matches!(self, Mode::Training(_))
    }
}

/// Everything one forward pass leaves behind for the matching backward pass:
/// the output volume of every layer and any per-layer scratch (dropout masks,
/// maxout switches).
///
/// Layers themselves keep no references between calls; a `Pass` is the only
/// place those live, and it is dropped when the caller is done with it.
#[derive(Debug)]
pub struct Pass {
    pub(crate) outputs: Vec<Vol>,
    pub(crate) caches: Vec<Cache>,
}

impl Pass {
    pub(crate) fn with_capacity(n: usize) -> Pass {
        Pass {
            outputs: Vec::with_capacity(n),
            caches: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, output: Vol, cache: Cache) {
        self.outputs.push(output);
        self.caches.push(cache);
    }

    /// The final layer's output.
    pub fn output(&self) -> &Vol {
        &self.outputs[self.outputs.len() - 1]
    }

    pub fn into_output(mut self) -> Vol {
        self.outputs.swap_remove(self.outputs.len() - 1)
    }

    /// Output of layer `i`.
    pub fn layer_output(&self, i: usize) -> &Vol {
        &self.outputs[i]
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Input, output and scratch of layer `i`. The input is the caller's
    /// volume for layer 0, otherwise the previous layer's output.
    pub(crate) fn layer_io<'a>(
        &'a mut self,
        x: &'a mut Vol,
        i: usize,
    ) -> (&'a mut Vol, &'a Vol, &'a Cache) {
        let cache = &self.caches[i];
        if i == 0 {
            (x, &self.outputs[0], cache)
        } else {
            let (head, tail) = self.outputs.split_at_mut(i);
            (&mut head[i - 1], &tail[0], cache)
        }
    }

    pub(crate) fn zero_grads(&mut self) {
        self.outputs.iter_mut().for_each(Vol::zero_grad);
    }
}
