//! [`VrpRoutingSolver`] implementation backed by `vrp-core`.

use std::time::Duration;

use tanker_core::{RoundProblem, RoutingSolver, SolveError, SolveOutcome};

use crate::vrp;

/// Configuration for [`VrpRoutingSolver`].
#[derive(Debug, Clone)]
pub struct VrpSolverConfig {
    /// Upper bound on `vrp-core` generations per round.
    pub max_generations: usize,
}

impl Default for VrpSolverConfig {
    fn default() -> Self {
        Self {
            max_generations: 200,
        }
    }
}

/// Round solver using `vrp-core` metaheuristics.
///
/// The search stops at the earlier of the round time limit (at least one
/// second) and [`VrpSolverConfig::max_generations`]. Results are not
/// guaranteed to be identical across runs.
#[derive(Debug, Clone, Default)]
pub struct VrpRoutingSolver {
    config: VrpSolverConfig,
}

impl VrpRoutingSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VrpSolverConfig::default())
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: VrpSolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &VrpSolverConfig {
        &self.config
    }
}

impl RoutingSolver for VrpRoutingSolver {
    fn solve(
        &self,
        problem: &RoundProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        log::debug!(
            "solving round with {} stops and {} vehicles",
            problem.node_count().saturating_sub(1),
            problem.vehicles().len()
        );
        vrp::solve_round(problem, time_limit, &self.config)
    }
}

#[cfg(test)]
mod tests;
