pub mod def;
pub mod net;
pub mod pass;

pub use def::{FcDef, LayerDef};
pub use net::Net;
pub use pass::{Mode, Pass};
