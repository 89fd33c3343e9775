//! SA configuration and the cooling schedule.

use crate::error::{ColorsortError, Result};

/// Cauchy (fast annealing) schedule: `T_k = T_0 / k`, with `k` starting at 1.
///
/// Cools very fast early and very slowly late. The number of steps until
/// the temperature falls to `T_end` is about `ceil(T_0 / T_end)`.
///
/// Reference: Szu & Hartley (1987), "Fast simulated annealing"
pub fn cauchy_temperature(initial_temperature: f64, k: usize) -> f64 {
    initial_temperature / k as f64
}

/// Configuration for the Simulated Annealing driver.
///
/// # Examples
///
/// ```
/// use colorsort::sa::SaConfig;
///
/// let config = SaConfig::default()
///     .with_initial_temperature(100.0)
///     .with_final_temperature(0.01)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.expected_iterations(), 10_000);
/// ```
#[derive(Debug, Clone)]
pub struct SaConfig {
    /// Initial temperature `T_0`. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The loop runs while the temperature is strictly above this.
    pub final_temperature: f64,

    /// Random seed for reproducibility. `None` draws one from the OS.
    pub seed: Option<u64>,

    /// Record the best energy every this many iterations.
    pub history_interval: usize,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            final_temperature: 0.001,
            seed: None,
            history_interval: 1000,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n.max(1);
        self
    }

    /// Approximate number of iterations the schedule will run.
    pub fn expected_iterations(&self) -> u64 {
        (self.initial_temperature / self.final_temperature).ceil() as u64
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(ColorsortError::config(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if !self.final_temperature.is_finite() || self.final_temperature <= 0.0 {
            return Err(ColorsortError::config(format!(
                "final_temperature must be positive and finite, got {}",
                self.final_temperature
            )));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err(ColorsortError::config(
                "final_temperature must be less than initial_temperature",
            ));
        }
        if self.history_interval == 0 {
            return Err(ColorsortError::config("history_interval must be at least 1"));
        }
        Ok(())
    }
}
