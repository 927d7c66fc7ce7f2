/// Categorical cross-entropy of softmax probabilities against a class index.
pub struct CrossEntropyLoss;

impl CrossEntropyLoss {
    /// L = -ln(p[class])
    pub fn loss(probs: &[f64], class: usize) -> f64 {
        -probs[class].ln()
    }

    /// Accumulates ∂L/∂z into `grad`, where z are the pre-softmax scores.
    ///
    /// Softmax and cross-entropy together simplify to `p - onehot(class)`,
    /// so the softmax Jacobian never has to be formed.
    pub fn accumulate_gradient(probs: &[f64], class: usize, grad: &mut [f64]) {
        for (i, (g, p)) in grad.iter_mut().zip(probs.iter()).enumerate() {
            let indicator = if i == class { 1.0 } else { 0.0 };
            *g += p - indicator;
        }
    }
}
