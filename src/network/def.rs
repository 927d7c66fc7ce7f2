use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetError, Result};
use crate::layers::{
    ActivationLayer, DropoutLayer, FullyConnLayer, InputLayer, Layer, MaxoutLayer, Propagate,
    RegressionLayer, SoftmaxLayer, SvmLayer,
};
use crate::math::init::WeightInit;
use crate::math::vol::Shape;

/// Options of a fully-connected definition.
///
/// Fields:
/// - `num_neurons`: output units (before maxout grouping)
/// - `activation`: nonlinearity emitted after the linear layer, if any
/// - `drop_prob`: emits a dropout layer after the activation
/// - `bias_pref`: initial bias; defaults to 0.1 for relu, else 0
/// - `l1_decay_mul` / `l2_decay_mul`: per-layer multipliers on the
///   trainer's decay for the weights (biases are never decayed)
/// - `init`: weight initialization policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FcDef {
    pub num_neurons: usize,
    pub activation: Option<ActivationFunction>,
    pub drop_prob: Option<f64>,
    pub bias_pref: Option<f64>,
    pub l1_decay_mul: f64,
    pub l2_decay_mul: f64,
    pub init: WeightInit,
}

impl Default for FcDef {
    fn default() -> Self {
        FcDef {
            num_neurons: 0,
            activation: None,
            drop_prob: None,
            bias_pref: None,
            l1_decay_mul: 0.0,
            l2_decay_mul: 1.0,
            init: WeightInit::default(),
        }
    }
}

impl FcDef {
    pub fn new(num_neurons: usize) -> FcDef {
        FcDef { num_neurons, ..Default::default() }
    }

    pub fn activation(mut self, activation: ActivationFunction) -> FcDef {
        self.activation = Some(activation);
        self
    }

    pub fn drop_prob(mut self, drop_prob: f64) -> FcDef {
        self.drop_prob = Some(drop_prob);
        self
    }

    pub fn bias_pref(mut self, bias_pref: f64) -> FcDef {
        self.bias_pref = Some(bias_pref);
        self
    }

    pub fn decay_mul(mut self, l1_decay_mul: f64, l2_decay_mul: f64) -> FcDef {
        self.l1_decay_mul = l1_decay_mul;
        self.l2_decay_mul = l2_decay_mul;
        self
    }

    pub fn init(mut self, init: WeightInit) -> FcDef {
        self.init = init;
        self
    }
}

/// A user-level layer description. Composite definitions expand into several
/// primitive layers when a `Net` is built:
///
/// - `Input`            → input
/// - `Fc`               → fc, then activation (if any), then dropout (if `drop_prob`)
/// - `Softmax`/`Svm`    → fc with `num_classes` units, then the loss layer
/// - `Regression`       → fc with `num_neurons` units, then regression
/// - `Activation`/`Dropout` → one layer each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerDef {
    Input { sx: usize, sy: usize, depth: usize },
    Fc(FcDef),
    Activation { function: ActivationFunction },
    Dropout { drop_prob: f64 },
    Softmax { num_classes: usize },
    Svm { num_classes: usize },
    Regression { num_neurons: usize },
}

impl LayerDef {
    pub fn input(sx: usize, sy: usize, depth: usize) -> LayerDef {
        LayerDef::Input { sx, sy, depth }
    }

    pub fn fc(num_neurons: usize, activation: ActivationFunction) -> LayerDef {
        LayerDef::Fc(FcDef::new(num_neurons).activation(activation))
    }

    pub fn activation(function: ActivationFunction) -> LayerDef {
        LayerDef::Activation { function }
    }

    pub fn dropout(drop_prob: f64) -> LayerDef {
        LayerDef::Dropout { drop_prob }
    }

    pub fn softmax(num_classes: usize) -> LayerDef {
        LayerDef::Softmax { num_classes }
    }

    pub fn svm(num_classes: usize) -> LayerDef {
        LayerDef::Svm { num_classes }
    }

    pub fn regression(num_neurons: usize) -> LayerDef {
        LayerDef::Regression { num_neurons }
    }

    fn is_loss(&self) -> bool {
        matches!(self, LayerDef::Softmax { .. } | LayerDef::Svm { .. } | LayerDef::Regression { .. })
    }
}

impl From<FcDef> for LayerDef {
    fn from(def: FcDef) -> Self {
        LayerDef::Fc(def)
    }
}

/// A single layer to build, tagged with the definition it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Primitive {
    pub index: usize,
    pub kind: PrimitiveKind,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PrimitiveKind {
    Input(Shape),
    FullyConn {
        num_neurons: usize,
        bias_pref: f64,
        init: WeightInit,
        l1_decay_mul: f64,
        l2_decay_mul: f64,
    },
    Activation(ActivationFunction),
    Dropout(f64),
    Softmax,
    Svm,
    Regression,
}

fn plain_fc(num_neurons: usize) -> PrimitiveKind {
    PrimitiveKind::FullyConn {
        num_neurons,
        bias_pref: 0.0,
        init: WeightInit::default(),
        l1_decay_mul: 0.0,
        l2_decay_mul: 1.0,
    }
}

fn check_drop_prob(index: usize, drop_prob: f64) -> Result<()> {
    if (0.0..1.0).contains(&drop_prob) {
        Ok(())
    } else {
        Err(NetError::InvalidDropProb { index, drop_prob })
    }
}

fn positive(index: usize, value: usize, what: &'static str) -> Result<usize> {
    if value == 0 {
        Err(NetError::ZeroSized { index, what })
    } else {
        Ok(value)
    }
}

/// Expands user-level definitions into the primitive layer sequence, in order.
pub(crate) fn desugar(defs: &[LayerDef]) -> Result<Vec<Primitive>> {
    match defs.first() {
        Some(LayerDef::Input { .. }) => {}
        _ => return Err(NetError::MissingInput),
    }

    let mut prims = Vec::with_capacity(defs.len() * 2);
    let mut emit = |index: usize, kind: PrimitiveKind| prims.push(Primitive { index, kind });

    for (index, def) in defs.iter().enumerate() {
        if def.is_loss() && index + 1 != defs.len() {
            return Err(NetError::LossNotLast { index });
        }
        match def {
            LayerDef::Input { sx, sy, depth } => {
                if index != 0 {
                    return Err(NetError::MisplacedInput { index });
                }
                if *sx == 0 || *sy == 0 || *depth == 0 {
                    return Err(NetError::ZeroSized { index, what: "input shape" });
                }
                emit(index, PrimitiveKind::Input(Shape::new(*sx, *sy, *depth)));
            }
            LayerDef::Fc(fc) => {
                let mut num_neurons = positive(index, fc.num_neurons, "num_neurons")?;
                if let Some(ActivationFunction::Maxout { group_size }) = fc.activation {
                    // The fc layer feeds group_size candidates per maxout unit.
                    num_neurons *= group_size;
                }
                let bias_pref = fc.bias_pref.unwrap_or(match fc.activation {
                    Some(ActivationFunction::Relu) => 0.1,
                    _ => 0.0,
                });
                emit(index, PrimitiveKind::FullyConn {
                    num_neurons,
                    bias_pref,
                    init: fc.init,
                    l1_decay_mul: fc.l1_decay_mul,
                    l2_decay_mul: fc.l2_decay_mul,
                });
                if let Some(activation) = fc.activation {
                    emit(index, PrimitiveKind::Activation(activation));
                }
                if let Some(drop_prob) = fc.drop_prob {
                    check_drop_prob(index, drop_prob)?;
                    emit(index, PrimitiveKind::Dropout(drop_prob));
                }
            }
            LayerDef::Activation { function } => emit(index, PrimitiveKind::Activation(*function)),
            LayerDef::Dropout { drop_prob } => {
                check_drop_prob(index, *drop_prob)?;
                emit(index, PrimitiveKind::Dropout(*drop_prob));
            }
            LayerDef::Softmax { num_classes } => {
                emit(index, plain_fc(positive(index, *num_classes, "num_classes")?));
                emit(index, PrimitiveKind::Softmax);
            }
            LayerDef::Svm { num_classes } => {
                emit(index, plain_fc(positive(index, *num_classes, "num_classes")?));
                emit(index, PrimitiveKind::Svm);
            }
            LayerDef::Regression { num_neurons } => {
                emit(index, plain_fc(positive(index, *num_neurons, "num_neurons")?));
                emit(index, PrimitiveKind::Regression);
            }
        }
    }

    Ok(prims)
}

/// Builds the primitive layers, threading each output shape into the next
/// layer and drawing initial weights from `rng`.
pub(crate) fn build<R: Rng + ?Sized>(prims: &[Primitive], rng: &mut R) -> Result<Vec<Layer>> {
    let mut layers: Vec<Layer> = Vec::with_capacity(prims.len());
    let mut shape = Shape::flat(0);

    for prim in prims {
        let layer = match &prim.kind {
            PrimitiveKind::Input(s) => Layer::Input(InputLayer::new(*s)),
            PrimitiveKind::FullyConn { num_neurons, bias_pref, init, l1_decay_mul, l2_decay_mul } => {
                Layer::FullyConn(
                    FullyConnLayer::new(shape, *num_neurons, *bias_pref, *init, rng)
                        .with_decay(*l1_decay_mul, *l2_decay_mul),
                )
            }
            PrimitiveKind::Activation(ActivationFunction::Maxout { group_size }) => {
                if *group_size == 0 || shape.depth % group_size != 0 {
                    return Err(NetError::InvalidGroupSize {
                        index: prim.index,
                        depth: shape.depth,
                        group_size: *group_size,
                    });
                }
                Layer::Maxout(MaxoutLayer::new(shape, *group_size))
            }
            PrimitiveKind::Activation(function) => Layer::Activation(ActivationLayer::new(shape, *function)),
            PrimitiveKind::Dropout(drop_prob) => Layer::Dropout(DropoutLayer::new(shape, *drop_prob)),
            PrimitiveKind::Softmax => Layer::Softmax(SoftmaxLayer::new(shape)),
            PrimitiveKind::Svm => Layer::Svm(SvmLayer::new(shape)),
            PrimitiveKind::Regression => Layer::Regression(RegressionLayer::new(shape)),
        };
        shape = layer.out_shape();
        layers.push(layer);
    }

    Ok(layers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_defs() -> Vec<LayerDef> {
        vec![
            LayerDef::input(1, 1, 2),
            LayerDef::fc(5, ActivationFunction::Tanh),
            LayerDef::fc(5, ActivationFunction::Tanh),
            LayerDef::softmax(3),
        ]
    }

    #[test]
    fn reference_stack_expands_to_seven() {
        let prims = desugar(&reference_defs()).unwrap();
        assert_eq!(prims.len(), 7);
        assert!(matches!(prims[0].kind, PrimitiveKind::Input(_)));
        assert!(matches!(prims[5].kind, PrimitiveKind::FullyConn { num_neurons: 3, .. }));
        assert_eq!(prims[6], Primitive { index: 3, kind: PrimitiveKind::Softmax });
    }

    #[test]
    fn no_activation_means_no_extra_layer() {
        let prims = desugar(&[LayerDef::input(1, 1, 2), FcDef::new(4).into()]).unwrap();
        assert_eq!(prims.len(), 2);
    }

    #[test]
    fn relu_gets_positive_bias_and_dropout_follows_activation() {
        let defs = [
            LayerDef::input(1, 1, 2),
            FcDef::new(4).activation(ActivationFunction::Relu).drop_prob(0.5).into(),
        ];
        let prims = desugar(&defs).unwrap();
        assert_eq!(prims.len(), 4);
        assert!(matches!(prims[1].kind, PrimitiveKind::FullyConn { bias_pref, .. } if bias_pref == 0.1));
        assert_eq!(prims[3].kind, PrimitiveKind::Dropout(0.5));
    }

    #[test]
    fn maxout_widens_fc() {
        let defs = [
            LayerDef::input(1, 1, 2),
            LayerDef::fc(3, ActivationFunction::Maxout { group_size: 2 }),
        ];
        let prims = desugar(&defs).unwrap();
        assert!(matches!(prims[1].kind, PrimitiveKind::FullyConn { num_neurons: 6, .. }));
    }

    #[test]
    fn configuration_errors() {
        assert_eq!(desugar(&[]), Err(NetError::MissingInput));
        assert_eq!(desugar(&[LayerDef::softmax(2)]), Err(NetError::MissingInput));
        assert_eq!(
            desugar(&[LayerDef::input(1, 1, 2), LayerDef::input(1, 1, 2)]),
            Err(NetError::MisplacedInput { index: 1 })
        );
        assert_eq!(
            desugar(&[LayerDef::input(1, 1, 2), LayerDef::softmax(2), LayerDef::fc(2, ActivationFunction::Tanh)]),
            Err(NetError::LossNotLast { index: 1 })
        );
        assert_eq!(
            desugar(&[LayerDef::input(1, 1, 2), LayerDef::softmax(0)]),
            Err(NetError::ZeroSized { index: 1, what: "num_classes" })
        );
        assert_eq!(
            desugar(&[LayerDef::input(1, 1, 2), LayerDef::dropout(1.0)]),
            Err(NetError::InvalidDropProb { index: 1, drop_prob: 1.0 })
        );
    }

    #[test]
    fn maxout_group_must_divide_depth() {
        let defs = [
            LayerDef::input(1, 1, 5),
            LayerDef::activation(ActivationFunction::Maxout { group_size: 2 }),
        ];
        let prims = desugar(&defs).unwrap();
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        assert_eq!(
            build(&prims, &mut rng).unwrap_err(),
            NetError::InvalidGroupSize { index: 1, depth: 5, group_size: 2 }
        );
    }

    #[test]
    fn shapes_flow_between_layers() {
        let prims = desugar(&reference_defs()).unwrap();
        let mut rng = rand::rngs::mock::StepRng::new(1, 7);
        let layers = build(&prims, &mut rng).unwrap();
        let names: Vec<_> = layers.iter().map(Layer::name).collect();
        assert_eq!(names, ["input", "fc", "tanh", "fc", "tanh", "fc", "softmax"]);
        assert_eq!(layers[6].out_shape(), Shape::flat(3));
    }
}
