pub mod cross_entropy;
pub mod hinge;
pub mod loss_data;
pub mod squared;

pub use cross_entropy::CrossEntropyLoss;
pub use hinge::HingeLoss;
pub use loss_data::LossData;
pub use squared::HalfSquaredLoss;
