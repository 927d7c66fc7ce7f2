pub mod method;

pub use method::{Hyper, Method, ParamState};
