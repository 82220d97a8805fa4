use statrs::distribution::{Continuous, ContinuousCDF, Normal};

use crate::constants::{DENSITY_CURVE_END, DENSITY_CURVE_START, DENSITY_CURVE_STEP};
use crate::error::{Result, SimulationError};

/// Gaussian weekly-score model parameterized by mean and variance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreSampler {
    mean: f64,
    variance: f64,
    std_dev: f64,
    normal: Normal,
}

impl ScoreSampler {
    /// Build a sampler. Variance must be strictly positive and both
    /// parameters finite.
    pub fn new(mean: f64, variance: f64) -> Result<Self> {
        let invalid = || SimulationError::InvalidDistributionParameters { mean, variance };
        if !mean.is_finite() || !variance.is_finite() || variance <= 0.0 {
            return Err(invalid());
        }
        let std_dev = variance.sqrt();
        let normal = Normal::new(mean, std_dev).map_err(|_| invalid())?;
        Ok(ScoreSampler {
            mean,
            variance,
            std_dev,
            normal,
        })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Quantile transform of a uniform draw `u` in (0, 1) into a score.
    pub fn sample(&self, u: f64) -> Result<f64> {
        if !(u > 0.0 && u < 1.0) {
            return Err(SimulationError::InvalidUniformDraw { value: u });
        }
        Ok(self.normal.inverse_cdf(u))
    }

    pub fn density(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }

    pub fn cumulative(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }

    /// Tabulate `(x, pdf(x))` from `start` to `end` inclusive.
    pub fn density_curve(&self, start: f64, end: f64, step: f64) -> Vec<(f64, f64)> {
        if step.is_nan() || step <= 0.0 || end < start {
            return Vec::new();
        }
        let points = ((end - start) / step).floor() as usize;
        (0..=points)
            .map(|i| {
                let x = start + i as f64 * step;
                (x, self.density(x))
            })
            .collect()
    }

    /// Density curve over the usual fantasy scoring range.
    pub fn default_density_curve(&self) -> Vec<(f64, f64)> {
        self.density_curve(DENSITY_CURVE_START, DENSITY_CURVE_END, DENSITY_CURVE_STEP)
    }
}
