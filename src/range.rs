//! Inclusive cardinality ranges

use crate::error::{DatagenError, DatagenResult};
use serde::Serialize;
use std::fmt;

/// Inclusive `[min, max]` interval used to bound cardinalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    min: usize,
    max: usize,
}

impl Range {
    /// Create a range, rejecting `min > max`
    pub fn new(min: usize, max: usize) -> DatagenResult<Self> {
        if min > max {
            return Err(DatagenError::Configuration(format!(
                "Range minimum {} is greater than maximum {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    /// A range holding exactly one value
    pub fn exactly(value: usize) -> Self {
        Self { min: value, max: value }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn contains(&self, value: usize) -> bool {
        self.min <= value && value <= self.max
    }

    /// Number of integers in the range; `None` when it does not fit a `usize`
    pub fn width(&self) -> Option<usize> {
        (self.max - self.min).checked_add(1)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.min, self.max)
    }
}
