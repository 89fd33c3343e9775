//! SA execution loop.

use super::config::{cauchy_temperature, SaConfig};
use super::types::SaState;
use crate::error::Result;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone> {
    /// The best state found.
    pub best: S,

    /// Energy of the best state.
    pub best_energy: f64,

    /// Total number of iterations (proposals evaluated).
    pub iterations: usize,

    /// Temperature of the last iteration that ran.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of accepted moves that lowered the current energy.
    pub improving_moves: usize,

    /// Best energy sampled every `history_interval` iterations.
    pub energy_history: Vec<f64>,
}

/// Executes the Simulated Annealing algorithm.
pub struct SaRunner;

impl SaRunner {
    /// Runs SA from `initial`, seeding the generator from `config.seed`.
    pub fn run<S: SaState>(initial: S, config: &SaConfig) -> Result<SaResult<S>> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::run_with(initial, config, &mut rng, |_| {})
    }

    /// Runs SA with an injected random source and a per-step observer.
    ///
    /// `on_step` is called once per iteration, after the acceptance
    /// decision, with the current state. It cannot influence the walk.
    pub fn run_with<S, R, F>(
        initial: S,
        config: &SaConfig,
        rng: &mut R,
        mut on_step: F,
    ) -> Result<SaResult<S>>
    where
        S: SaState,
        R: Rng,
        F: FnMut(&S),
    {
        config.validate()?;

        let mut current = initial;
        let mut current_energy = current.energy();
        let mut best = current.clone();
        let mut best_energy = current_energy;

        info!(
            "annealing from E={:.4}, T0={}, T_end={}, ~{} iterations",
            current_energy,
            config.initial_temperature,
            config.final_temperature,
            config.expected_iterations()
        );

        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut energy_history = vec![best_energy];
        let mut final_temperature = config.initial_temperature;

        let mut k = 1usize;
        loop {
            let temperature = cauchy_temperature(config.initial_temperature, k);
            if temperature <= config.final_temperature {
                break;
            }
            final_temperature = temperature;

            let mut candidate = current.propose(rng);
            let candidate_energy = candidate.energy();
            let probability = acceptance_probability(current_energy, candidate_energy, temperature);

            let mut event = "";
            if probability > rng.random_range(0.0..1.0) {
                event = if candidate_energy > current_energy {
                    "$"
                } else {
                    "+"
                };
                if candidate_energy < current_energy {
                    improving_moves += 1;
                }
                accepted_moves += 1;
                current = candidate;
                current_energy = candidate_energy;

                if current_energy < best_energy {
                    best = current.clone();
                    best_energy = current_energy;
                }
            }

            debug!(
                "({k})\tT={temperature:.5}\tE={current_energy:.2}\tNE={candidate_energy:.2}\tB={best_energy:.2}\tp={probability:.2}\t{event}"
            );

            on_step(&current);

            if k.is_multiple_of(config.history_interval) {
                energy_history.push(best_energy);
            }
            k += 1;
        }

        let iterations = k - 1;
        if energy_history
            .last()
            .is_none_or(|&last| (last - best_energy).abs() > 1e-15)
        {
            energy_history.push(best_energy);
        }

        info!(
            "annealing finished after {iterations} iterations: best E={best_energy:.4}, accepted {accepted_moves} ({improving_moves} improving)"
        );

        Ok(SaResult {
            best,
            best_energy,
            iterations,
            final_temperature,
            accepted_moves,
            improving_moves,
            energy_history,
        })
    }
}

/// Metropolis acceptance probability `exp((E_current - E_candidate) / T)`.
///
/// When the exponential is not finite (overflow near `T = 0`, or NaN
/// energies) the rule degrades to "accept iff strictly better", so the
/// result no longer depends on the random draw.
pub fn acceptance_probability(current_energy: f64, candidate_energy: f64, temperature: f64) -> f64 {
    let probability = ((current_energy - candidate_energy) / temperature).exp();
    if probability.is_finite() {
        probability
    } else if current_energy > candidate_energy {
        1.0
    } else {
        0.0
    }
}
