use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{NetError, Result};
use crate::layers::{Layer, Objective, ParamGroup, Propagate};
use crate::loss::loss_data::LossData;
use crate::math::vol::{Shape, Vol};
use crate::network::def::{self, LayerDef};
use crate::network::pass::{Mode, Pass};

/// An ordered stack of primitive layers.
///
/// Nets are built once by [`Net::make_layers`] and never gain or lose layers.
/// Per-pass state lives in a [`Pass`], so the net itself only holds layers,
/// their parameters, and the random source used for dropout.
#[derive(Debug, Clone)]
pub struct Net {
    layers: Vec<Layer>,
    rng: StdRng,
}

impl Net {
    /// Desugars `defs` into primitive layers and initializes their weights
    /// from `rng`. Identical definitions and seeds give identical nets.
    pub fn make_layers<R: Rng + ?Sized>(defs: &[LayerDef], rng: &mut R) -> Result<Net> {
        let prims = def::desugar(defs)?;
        let layers = def::build(&prims, rng)?;
        let net = Net {
            layers,
            rng: StdRng::seed_from_u64(rng.gen()),
        };
        log::debug!(
            "built {} layers from {} definitions, input {:?}, {} parameters",
            net.layers.len(),
            defs.len(),
            net.input_shape(),
            net.param_count()
        );
        Ok(net)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_shape(&self) -> Shape {
        self.layers[0].out_shape()
    }

    pub fn output_shape(&self) -> Shape {
        self.layers[self.layers.len() - 1].out_shape()
    }

    /// Total number of trainable scalars.
    pub fn param_count(&self) -> usize {
        self.layers.iter().flat_map(|l| l.params()).map(Vol::len).sum()
    }

    /// Forward pass returning only the final output.
    ///
    /// With `is_training` set, dropout layers draw fresh masks from the net's
    /// own random source; otherwise this is a pure function of `x` and the
    /// current parameters.
    ///
    /// # Panics
    /// Panics if `x` does not have the input layer's shape.
    pub fn forward(&mut self, x: &Vol, is_training: bool) -> Vol {
        self.forward_pass(x, is_training).into_output()
    }

    /// Inference-mode forward pass that only needs shared access.
    pub fn predict(&self, x: &Vol) -> Vol {
        run(&self.layers, x, &mut Mode::Inference).into_output()
    }

    /// Index of the highest-scoring output.
    pub fn predict_class(&self, x: &Vol) -> usize {
        self.predict(x).argmax()
    }

    /// Forward pass keeping every layer's output for a later [`Net::backward`].
    pub fn forward_pass(&mut self, x: &Vol, is_training: bool) -> Pass {
        let Net { layers, rng } = self;
        let mut mode = if is_training { Mode::Training(rng) } else { Mode::Inference };
        run(layers, x, &mut mode)
    }

    /// Loss of the terminal layer for input `x`, without touching any gradient.
    pub fn cost_loss(&self, x: &Vol, target: &LossData) -> Result<f64> {
        let objective = self.objective()?;
        let pass = run(&self.layers, x, &mut Mode::Inference);
        objective.cost(pass.output(), target)
    }

    /// Backpropagates `target` through the graph recorded in `pass`.
    ///
    /// Zeroes `x.dw` and every intermediate gradient, seeds the terminal loss
    /// layer, then walks the layers in reverse. Afterwards `x.dw` holds
    /// ∂loss/∂x and each parameter gradient has been accumulated into (not
    /// reset). Returns the loss.
    ///
    /// # Panics
    /// Panics if `pass` holds a different number of layer outputs than this
    /// net has layers.
    pub fn backward(&mut self, x: &mut Vol, pass: &mut Pass, target: &LossData) -> Result<f64> {
        let n = self.layers.len();
        assert_eq!(pass.len(), n, "pass has {} layer outputs, network has {} layers", pass.len(), n);

        x.zero_grad();
        pass.zero_grads();

        let loss = {
            let objective = self.objective()?;
            let (input, output, _) = pass.layer_io(x, n - 1);
            objective.seed_gradient(input, output, target)?
        };

        for i in (0..n - 1).rev() {
            let (input, output, cache) = pass.layer_io(x, i);
            self.layers[i].backward(input, output, cache);
        }

        Ok(loss)
    }

    /// Every trainable parameter tensor, in a stable order.
    pub fn params_and_grads(&mut self) -> Vec<ParamGroup<'_>> {
        self.layers.iter_mut().flat_map(|l| l.params_and_grads()).collect()
    }

    fn objective(&self) -> Result<&dyn Objective> {
        self.layers[self.layers.len() - 1].objective().ok_or(NetError::NoObjective)
    }
}

fn run(layers: &[Layer], x: &Vol, mode: &mut Mode<'_>) -> Pass {
    let mut pass = Pass::with_capacity(layers.len());
    for (i, layer) in layers.iter().enumerate() {
        let input = if i == 0 { x } else { pass.layer_output(i - 1) };
        let (output, cache) = layer.forward(input, mode);
        pass.push(output, cache);
    }
    pass
}
