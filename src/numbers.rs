//! Number generators for cardinalities and index selection
//!
//! All generators draw from the caller's random source so that a seeded
//! dataset run is reproducible end to end.

use crate::error::{DatagenError, DatagenResult};
use rand::seq::index;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Exp, Normal};

/// Produces a count inside an inclusive range
pub trait NumberGenerator {
    /// Draw a single value in `[min, max]`
    fn generate_single(&self, min: usize, max: usize, rng: &mut dyn RngCore) -> usize;

    fn description(&self) -> String;
}

impl<G: NumberGenerator + ?Sized> NumberGenerator for Box<G> {
    fn generate_single(&self, min: usize, max: usize, rng: &mut dyn RngCore) -> usize {
        (**self).generate_single(min, max, rng)
    }

    fn description(&self) -> String {
        (**self).description()
    }
}

/// Uniform draw: every integer in the range is equally likely
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatDistribution;

impl FlatDistribution {
    pub fn new() -> Self {
        Self
    }
}

impl NumberGenerator for FlatDistribution {
    fn generate_single(&self, min: usize, max: usize, rng: &mut dyn RngCore) -> usize {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }

    fn description(&self) -> String {
        "flat".to_string()
    }
}

/// Half-normal draw anchored at `min`
///
/// Values cluster near the lower bound and thin out towards `max`;
/// `sigma` is the standard deviation as a fraction of the range width.
#[derive(Debug, Clone, Copy)]
pub struct NormalDistribution {
    sigma: f64,
    normal: Normal<f64>,
}

impl NormalDistribution {
    pub const DEFAULT_SIGMA: f64 = 0.4;

    pub fn new(sigma: f64) -> DatagenResult<Self> {
        let normal = Normal::new(0.0, sigma).map_err(|e| {
            DatagenError::Configuration(format!("Invalid normal sigma {}: {}", sigma, e))
        })?;
        Ok(Self { sigma, normal })
    }
}

impl NumberGenerator for NormalDistribution {
    fn generate_single(&self, min: usize, max: usize, rng: &mut dyn RngCore) -> usize {
        if min >= max {
            return min;
        }
        let width = (max - min) as f64;
        let offset = (self.normal.sample(rng).abs() * width).round();
        clamp_offset(min, max, offset)
    }

    fn description(&self) -> String {
        format!("normal (sigma {})", self.sigma)
    }
}

/// Exponential draw anchored at `min`, with `mean` as a fraction of the
/// range width
#[derive(Debug, Clone, Copy)]
pub struct ExponentialDistribution {
    mean: f64,
    exp: Exp<f64>,
}

impl ExponentialDistribution {
    pub const DEFAULT_MEAN: f64 = 0.25;

    pub fn new(mean: f64) -> DatagenResult<Self> {
        if mean.is_nan() || mean <= 0.0 {
            return Err(DatagenError::Configuration(format!(
                "Exponential mean must be positive, got {}",
                mean
            )));
        }
        let exp = Exp::new(1.0 / mean).map_err(|e| {
            DatagenError::Configuration(format!("Invalid exponential mean {}: {}", mean, e))
        })?;
        Ok(Self { mean, exp })
    }
}

impl NumberGenerator for ExponentialDistribution {
    fn generate_single(&self, min: usize, max: usize, rng: &mut dyn RngCore) -> usize {
        if min >= max {
            return min;
        }
        let width = (max - min) as f64;
        let offset = (self.exp.sample(rng) * width).round();
        clamp_offset(min, max, offset)
    }

    fn description(&self) -> String {
        format!("exponential (mean {})", self.mean)
    }
}

fn clamp_offset(min: usize, max: usize, offset: f64) -> usize {
    if !offset.is_finite() || offset <= 0.0 {
        return min;
    }
    let offset = offset as usize;
    min.saturating_add(offset).min(max)
}

/// Uniform sampling without replacement over `[0, domain)`
///
/// Holds no state between requests; every call is an independent draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueNumbers;

impl UniqueNumbers {
    /// Draw `count` pairwise-distinct values from `[0, domain)`, every
    /// subset of that size being equally likely
    pub fn sample(domain: usize, count: usize, rng: &mut dyn RngCore) -> DatagenResult<Vec<usize>> {
        if count > domain {
            return Err(DatagenError::DomainExhausted {
                requested: count,
                domain,
            });
        }
        Ok(index::sample(rng, domain, count).into_vec())
    }
}
