/// Multiclass hinge (SVM) loss on raw scores.
pub struct HingeLoss;

const MARGIN: f64 = 1.0;

impl HingeLoss {
    /// L = Σ_{i≠class} max(0, s_i - s_class + margin)
    pub fn loss(scores: &[f64], class: usize) -> f64 {
        let target = scores[class];
        scores.iter().enumerate()
            .filter(|(i, _)| *i != class)
            .map(|(_, s)| (s - target + MARGIN).max(0.0))
            .sum()
    }

    /// Accumulates the subgradient into `grad` and returns the loss.
    /// Every violated margin pushes its own score up by one and the
    /// ground-truth score down by one.
    pub fn accumulate_gradient(scores: &[f64], class: usize, grad: &mut [f64]) -> f64 {
        let target = scores[class];
        let mut loss = 0.0;
        for (i, s) in scores.iter().enumerate() {
            if i == class {
                continue;
            }
            let diff = s - target + MARGIN;
            if diff > 0.0 {
                grad[i] += 1.0;
                grad[class] -= 1.0;
                loss += diff;
            }
        }
        loss
    }
}
