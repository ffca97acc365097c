// Transform — per-sample preprocessing pipeline

use rowset_core::{Error, Result};

use crate::dataset::{Dataset, Sample};

/// A transform applied to each sample before batching.
pub trait Transform: Send + Sync {
    /// Apply the transform to a sample, returning the modified sample.
    fn apply(&self, sample: Sample) -> Sample;
}

// Built-in transforms

/// Divide every feature by a fixed scale factor.
#[derive(Debug, Clone)]
pub struct Normalize {
    scale: f64,
}

impl Normalize {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl Transform for Normalize {
    fn apply(&self, mut sample: Sample) -> Sample {
        for v in &mut sample.features {
            *v /= self.scale;
        }
        sample
    }
}

/// Standardize every feature with one shared mean and standard deviation.
#[derive(Debug, Clone)]
pub struct Standardize {
    pub mean: f64,
    pub std: f64,
}

impl Standardize {
    pub fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }
}

impl Transform for Standardize {
    fn apply(&self, mut sample: Sample) -> Sample {
        for v in &mut sample.features {
            *v = (*v - self.mean) / self.std;
        }
        sample
    }
}

/// Per-feature standardization with statistics fitted on a dataset.
///
/// Fit on the training partition only and reuse the result for validation
/// and test data. Constant features (std of 0) are only centered.
#[derive(Debug, Clone)]
pub struct ColumnStandardize {
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

impl ColumnStandardize {
    pub fn new(means: Vec<f64>, stds: Vec<f64>) -> Self {
        Self { means, stds }
    }

    /// Compute per-feature mean and population std over every sample.
    pub fn fit(dataset: &dyn Dataset) -> Result<Self> {
        let n = dataset.len();
        if n == 0 {
            return Err(Error::InvalidConfig(
                "cannot fit statistics on an empty dataset".to_string(),
            ));
        }
        let width = dataset.num_features();
        let mut sum = vec![0.0; width];
        let mut sum_sq = vec![0.0; width];
        for i in 0..n {
            let s = dataset.get(i)?;
            for (j, &v) in s.features.iter().enumerate() {
                sum[j] += v;
                sum_sq[j] += v * v;
            }
        }
        let n = n as f64;
        let means: Vec<f64> = sum.iter().map(|s| s / n).collect();
        let stds = sum_sq
            .iter()
            .zip(&means)
            .map(|(sq, m)| (sq / n - m * m).max(0.0).sqrt())
            .collect();
        Ok(Self { means, stds })
    }
}

impl Transform for ColumnStandardize {
    fn apply(&self, mut sample: Sample) -> Sample {
        for ((v, m), s) in sample.features.iter_mut().zip(&self.means).zip(&self.stds) {
            *v -= m;
            if *s > 0.0 {
                *v /= s;
            }
        }
        sample
    }
}

/// Chain multiple transforms.
pub struct Compose {
    transforms: Vec<Box<dyn Transform>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Transform>>) -> Self {
        Self { transforms }
    }
}

impl Transform for Compose {
    fn apply(&self, mut sample: Sample) -> Sample {
        for t in &self.transforms {
            sample = t.apply(sample);
        }
        sample
    }
}
