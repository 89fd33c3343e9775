//! Arrangement configuration.

use crate::error::{ColorsortError, Result};

/// Size of a "worst fraction" subset: `min(limit, ceil(ratio * count))`.
pub fn top_k(ratio: f64, limit: usize, count: usize) -> usize {
    let share = (ratio * count as f64).ceil() as usize;
    share.min(limit)
}

/// Parameters of the circular arrangement and its move proposals.
///
/// # Examples
///
/// ```
/// use colorsort::sort::ArrangementConfig;
///
/// let config = ArrangementConfig::default().with_radius(5).with_max_moves(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangementConfig {
    /// Neighborhood radius S: each slot is scored against the S slots on
    /// either side. Clamped to `N - 1` for short sequences.
    pub radius: usize,

    /// Fraction of worst-scoring slots that move proposals draw from.
    pub greed_ratio: f64,

    /// Upper bound on the greedy subset size.
    pub greedy_limit: usize,

    /// Each proposal applies between 1 and this many relocations.
    pub max_moves: usize,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            radius: 7,
            greed_ratio: 0.15,
            greedy_limit: 100,
            max_moves: 10,
        }
    }
}

impl ArrangementConfig {
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_greed_ratio(mut self, ratio: f64) -> Self {
        self.greed_ratio = ratio;
        self
    }

    pub fn with_greedy_limit(mut self, limit: usize) -> Self {
        self.greedy_limit = limit;
        self
    }

    pub fn with_max_moves(mut self, n: usize) -> Self {
        self.max_moves = n;
        self
    }

    /// Number of slots proposals pick sources from, for a sequence of `len`.
    pub fn greedy_subset(&self, len: usize) -> usize {
        top_k(self.greed_ratio, self.greedy_limit, len).clamp(1, len.max(1))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.radius == 0 {
            return Err(ColorsortError::config("radius must be at least 1"));
        }
        if !(self.greed_ratio > 0.0 && self.greed_ratio <= 1.0) {
            return Err(ColorsortError::config(format!(
                "greed_ratio must be in (0, 1], got {}",
                self.greed_ratio
            )));
        }
        if self.greedy_limit == 0 {
            return Err(ColorsortError::config("greedy_limit must be at least 1"));
        }
        if self.max_moves == 0 {
            return Err(ColorsortError::config("max_moves must be at least 1"));
        }
        Ok(())
    }
}
