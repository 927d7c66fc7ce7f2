use serde::{Deserialize, Serialize};

/// Ground truth handed to the terminal loss layer.
///
/// - `Class`: class index for softmax and svm layers.
/// - `Target`: full target vector for a regression layer.
/// - `Component`: regress a single output toward `value`; the other outputs
///   contribute neither loss nor gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossData {
    Class(usize),
    Target(Vec<f64>),
    Component { dim: usize, value: f64 },
}

impl LossData {
    pub fn class(dim: usize) -> LossData {
        LossData::Class(dim)
    }

    pub fn target(values: Vec<f64>) -> LossData {
        LossData::Target(values)
    }

    /// The class index, if this is classification data.
    pub fn as_class(&self) -> Option<usize> {
        match self {
            LossData::Class(c) => Some(*c),
            _ => None,
        }
    }
}
