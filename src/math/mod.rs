pub mod init;
pub mod vol;

pub use init::WeightInit;
pub use vol::{Shape, Vol};
