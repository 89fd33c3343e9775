//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima. The driver here uses the Cauchy schedule `T_k = T_0 / k`
//! and returns the best state it ever held.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Szu & Hartley (1987), "Fast Simulated Annealing"

mod config;
mod runner;
mod types;

pub use config::{cauchy_temperature, SaConfig};
pub use runner::{acceptance_probability, SaResult, SaRunner};
pub use types::SaState;
