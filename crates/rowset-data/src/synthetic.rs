// Synthetic data — small linear-regression tables for demos and tests

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use rowset_core::{Result, SampleTable};

/// Parameters for [`linear_table`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub rows: usize,
    /// Number of feature columns; one target column is appended.
    pub features: usize,
    /// Amplitude of the uniform noise added to the target.
    pub noise: f64,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            rows: 1000,
            features: 10,
            noise: 0.1,
            seed: 0,
        }
    }
}

impl SyntheticConfig {
    pub fn rows(mut self, n: usize) -> Self {
        self.rows = n;
        self
    }

    pub fn features(mut self, n: usize) -> Self {
        self.features = n;
        self
    }

    pub fn noise(mut self, x: f64) -> Self {
        self.noise = x;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = s;
        self
    }
}

/// `rows x (features + 1)` table: features uniform in `[0, 1)`, last column
/// `y = w · x + noise * e` with `w` in `[-1, 1)` and `e` in `[-1, 1)`.
pub fn linear_table(config: &SyntheticConfig) -> Result<SampleTable> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let weights: Vec<f64> = (0..config.features)
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect();

    let cols = config.features + 1;
    let mut data = Vec::with_capacity(config.rows * cols);
    for _ in 0..config.rows {
        let mut y = 0.0;
        for w in &weights {
            let x: f64 = rng.gen();
            y += w * x;
            data.push(x);
        }
        y += config.noise * rng.gen_range(-1.0f64..1.0);
        data.push(y);
    }

    SampleTable::new(data, config.rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_and_range() {
        let t = linear_table(&SyntheticConfig::default().rows(50).features(3).seed(1)).unwrap();
        assert_eq!(t.shape(), (50, 4));
        for row in t.rows() {
            assert!(row[..3].iter().all(|&x| (0.0..1.0).contains(&x)));
        }
    }

    #[test]
    fn seeded_is_deterministic() {
        let cfg = SyntheticConfig::default().rows(20).features(2).seed(42);
        let a = linear_table(&cfg).unwrap();
        assert_eq!(a, linear_table(&cfg).unwrap());
        assert_ne!(a, linear_table(&cfg.clone().seed(43)).unwrap());
    }

    #[test]
    fn noiseless_target_is_linear() {
        let cfg = SyntheticConfig::default().rows(5).features(1).noise(0.0).seed(3);
        let t = linear_table(&cfg).unwrap();
        // y / x is the same weight for every row
        let ratios: Vec<f64> = t.rows().map(|r| r[1] / r[0]).collect();
        for r in &ratios {
            assert!((r - ratios[0]).abs() < 1e-9);
        }
    }
}
