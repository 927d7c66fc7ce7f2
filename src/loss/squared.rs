/// Half squared error, the regression loss: ½(p − y)² per output.
pub struct HalfSquaredLoss;

impl HalfSquaredLoss {
    pub fn loss(predicted: f64, expected: f64) -> f64 {
        let d = predicted - expected;
        0.5 * d * d
    }

    /// ∂L/∂p = p − y
    pub fn derivative(predicted: f64, expected: f64) -> f64 {
        predicted - expected
    }
}
