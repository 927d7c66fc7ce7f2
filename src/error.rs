use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors surfaced while building a network, configuring a trainer, or
/// evaluating a loss.
///
/// Shape mismatches at `forward` time and out-of-range coordinates are not
/// represented here: those are programming errors and panic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    /// The definition list is empty or does not start with an input layer.
    #[error("the first layer definition must be an input layer")]
    MissingInput,

    /// An input definition appears after the first position.
    #[error("input layer definition at index {index} is not first")]
    MisplacedInput { index: usize },

    /// A loss definition (softmax, svm, regression) is followed by more layers.
    #[error("loss layer definition at index {index} must be the last definition")]
    LossNotLast { index: usize },

    /// A size parameter is zero.
    #[error("layer definition at index {index}: {what} must be positive")]
    ZeroSized { index: usize, what: &'static str },

    /// Dropout probability outside [0, 1).
    #[error("layer definition at index {index}: drop probability {drop_prob} is outside [0, 1)")]
    InvalidDropProb { index: usize, drop_prob: f64 },

    /// Maxout group size is zero or does not divide the incoming depth.
    #[error("layer definition at index {index}: maxout group size {group_size} does not divide depth {depth}")]
    InvalidGroupSize { index: usize, depth: usize, group_size: usize },

    /// The network has no terminal loss layer to evaluate.
    #[error("the last layer is not a loss layer")]
    NoObjective,

    /// The supplied loss data does not fit the terminal loss layer.
    #[error("{layer} layer expects {expected} loss data")]
    LossMismatch { layer: &'static str, expected: &'static str },

    /// Ground-truth class index is out of range.
    #[error("class {class} is out of range for {classes} classes")]
    ClassOutOfRange { class: usize, classes: usize },

    /// Regression target vector has the wrong length.
    #[error("regression target has {found} values, expected {expected}")]
    TargetLength { expected: usize, found: usize },

    /// Regression component index is out of range.
    #[error("regression dimension {dim} is out of range for {len} outputs")]
    DimOutOfRange { dim: usize, len: usize },

    /// A trainer option is out of its valid range.
    #[error("invalid trainer option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
}
