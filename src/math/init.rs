use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// How trainable weights are drawn when a layer is built.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Xavier (Glorot): N(0, sqrt(1 / fan_in)). Suits tanh and sigmoid.
    #[default]
    Xavier,
    /// He: N(0, sqrt(2 / fan_in)). Suits relu.
    He,
    /// Uniform on [-scale, scale).
    Uniform { scale: f64 },
}

impl WeightInit {
    /// Draws one weight for a unit with `fan_in` incoming connections.
    pub fn sample<R: Rng + ?Sized>(&self, fan_in: usize, rng: &mut R) -> f64 {
        let fan_in = fan_in.max(1) as f64;
        match self {
            WeightInit::Xavier => sample_standard_normal(rng) * (1.0 / fan_in).sqrt(),
            WeightInit::He => sample_standard_normal(rng) * (2.0 / fan_in).sqrt(),
            WeightInit::Uniform { scale } => (rng.gen::<f64>() * 2.0 - 1.0) * scale,
        }
    }

    /// Fills `out` with independent draws.
    pub fn fill<R: Rng + ?Sized>(&self, out: &mut [f64], fan_in: usize, rng: &mut R) {
        for w in out.iter_mut() {
            *w = self.sample(fan_in, rng);
        }
    }
}

/// Samples a single value from N(0, 1) using the Box-Muller transform.
fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // (0, 1] keeps ln() finite.
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = 1.0 - rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn same_seed_same_weights() {
        let mut a = vec![0.0; 16];
        let mut b = vec![0.0; 16];
        WeightInit::Xavier.fill(&mut a, 4, &mut StdRng::seed_from_u64(7));
        WeightInit::Xavier.fill(&mut b, 4, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn xavier_is_roughly_zero_mean_with_fan_in_variance() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut w = vec![0.0; 20_000];
        WeightInit::Xavier.fill(&mut w, 4, &mut rng);
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let var = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.02, "mean {mean}");
        assert!((var - 0.25).abs() < 0.02, "variance {var}");
    }

    #[test]
    fn uniform_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let w = WeightInit::Uniform { scale: 0.5 }.sample(10, &mut rng);
            assert!((-0.5..0.5).contains(&w));
        }
    }
}
