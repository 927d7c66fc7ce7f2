//! A small feed-forward neural network engine built on 3-D volumes.
//!
//! Networks are described as a list of [`LayerDef`]s, desugared into
//! primitive layers by [`Net::make_layers`], and trained one example at a
//! time by a [`Trainer`]. Every layer implements its own backward pass; there
//! is no tape or graph recorder beyond the per-call [`Pass`].

pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::activation::ActivationFunction;
pub use error::{NetError, Result};
pub use layers::{Layer, Propagate};
pub use loss::loss_data::LossData;
pub use math::init::WeightInit;
pub use math::vol::{Shape, Vol};
pub use network::def::{FcDef, LayerDef};
pub use network::net::Net;
pub use network::pass::Pass;
pub use optim::method::Method;
pub use train::loop_fn::train_loop;
pub use train::train_stats::TrainStats;
pub use train::trainer::Trainer;
pub use train::trainer_options::TrainerOptions;
