//! Routing-solver seam: the trait a backend implements for one round and
//! the routes it returns.

use std::time::Duration;

use thiserror::Error;

use crate::{Minutes, RoundProblem};

/// A visit made by a vehicle in a solved round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStop {
    /// Problem node visited (never the depot).
    pub node: usize,
    /// Minute unloading starts.
    pub arrival: Minutes,
    /// Minute the vehicle leaves the node.
    pub departure: Minutes,
    /// Cumulative quantity delivered on the trip, including this stop.
    pub load: u32,
}

/// The trip one vehicle makes in a solved round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleRoute {
    /// Index into [`RoundProblem::vehicles`].
    pub vehicle: usize,
    /// Minute the vehicle leaves the depot.
    pub departure: Minutes,
    /// Stops in visiting order.
    pub stops: Vec<RouteStop>,
    /// Minute the vehicle is back at the depot.
    pub completion: Minutes,
}

impl VehicleRoute {
    /// Quantity delivered on the trip.
    #[must_use]
    pub fn total_load(&self) -> u32 {
        self.stops.last().map_or(0, |stop| stop.load)
    }
}

/// Routes found for a round.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoundSolution {
    /// At most one route per vehicle.
    pub routes: Vec<VehicleRoute>,
    /// Delivery nodes the solver left out.
    pub dropped: Vec<usize>,
}

/// Outcome of a solve attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The solver produced an assignment.
    Solved(RoundSolution),
    /// The search found nothing within its budget.
    NoSolution,
}

/// Errors returned by [`RoutingSolver::solve`].
///
/// These are contract violations in the problem handed to the solver;
/// failing to find a solution is [`SolveOutcome::NoSolution`], not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The solver rejected the problem model.
    #[error("invalid routing problem: {message}")]
    InvalidProblem {
        /// Detail from the solver backend.
        message: String,
    },
    /// A route referenced a vehicle the problem does not have.
    #[error("solver returned a route for unknown vehicle {index}")]
    UnknownVehicle {
        /// Offending vehicle index.
        index: usize,
    },
}

/// Solve a single-trip capacitated routing problem with time windows.
///
/// Implementations must treat vehicles as leaving the depot at or after
/// their earliest start, respect capacities and service windows, keep
/// unloading out of the lunch break and bring vehicles back by the horizon.
/// Solvers must be `Send + Sync` to operate safely across threads.
pub trait RoutingSolver: Send + Sync {
    /// Solve `problem` within `time_limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SolveError`] when the problem cannot be modelled.
    fn solve(&self, problem: &RoundProblem, time_limit: Duration)
    -> Result<SolveOutcome, SolveError>;
}

impl<T: RoutingSolver + ?Sized> RoutingSolver for &T {
    fn solve(
        &self,
        problem: &RoundProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        (**self).solve(problem, time_limit)
    }
}

impl<T: RoutingSolver + ?Sized> RoutingSolver for Box<T> {
    fn solve(
        &self,
        problem: &RoundProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        (**self).solve(problem, time_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn total_load_is_last_cumulative_load() {
        let route = VehicleRoute {
            vehicle: 0,
            departure: 420,
            stops: vec![
                RouteStop {
                    node: 1,
                    arrival: 450,
                    departure: 470,
                    load: 50,
                },
                RouteStop {
                    node: 2,
                    arrival: 540,
                    departure: 560,
                    load: 130,
                },
            ],
            completion: 590,
        };
        assert_eq!(route.total_load(), 130);
    }

    #[rstest]
    fn empty_route_carries_nothing() {
        let route = VehicleRoute {
            vehicle: 0,
            departure: 420,
            stops: Vec::new(),
            completion: 420,
        };
        assert_eq!(route.total_load(), 0);
    }
}
