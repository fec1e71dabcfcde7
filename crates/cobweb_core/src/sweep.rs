use crate::traits::Scalar;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// An inclusive parameter range [min, max] walked in ascending `step`
/// increments. Shared by the orbit sampler and the branch curve sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSweep<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

impl<T: Scalar> ParamSweep<T> {
    pub fn new(min: T, max: T, step: T) -> Self {
        Self { min, max, step }
    }

    /// Checks the sweep bounds. Samplers call this before producing any
    /// output, so an invalid sweep never yields partial data.
    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || !self.step.is_finite() {
            bail!("Sweep bounds must be finite.");
        }
        if self.step <= T::zero() {
            bail!("Sweep step must be positive.");
        }
        if self.min > self.max {
            bail!("Sweep min must not exceed max.");
        }
        if ((self.max - self.min) / self.step).floor().to_usize().is_none() {
            bail!("Sweep spans too many samples to enumerate.");
        }
        Ok(())
    }

    /// Number of values an iteration over this sweep yields:
    /// floor((max - min) / step) + 1. Meaningful only for a validated sweep.
    pub fn sample_count(&self) -> usize {
        ((self.max - self.min) / self.step)
            .floor()
            .to_usize()
            .map_or(0, |n| n + 1)
    }

    /// The sweep values in ascending order, `min` first. Each value is
    /// computed as min + i*step rather than by accumulation, so rounding
    /// error does not drift across a long sweep.
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.sample_count()).map(move |i| self.min + T::from_usize(i).unwrap() * self.step)
    }
}
