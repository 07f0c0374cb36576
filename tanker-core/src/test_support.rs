//! Deterministic fakes and builders shared by unit, behaviour and
//! downstream crate tests.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use crate::{
    Delivery, Location, Minutes, NodeRequirement, Order, Priority, RoundProblem, RoundSolution,
    RouteStop, RoutingSolver, SolveError, SolveOutcome, TimeWindow, TravelTimeEstimator, Vehicle,
    VehicleRoute,
};

/// Estimator returning the same minutes for every pair of distinct names,
/// with optional per-pair overrides.
#[derive(Debug, Clone, Default)]
pub struct FixedTravelTimeEstimator {
    minutes: Minutes,
    overrides: HashMap<(String, String), Minutes>,
}

impl FixedTravelTimeEstimator {
    /// Every leg takes `minutes`.
    #[must_use]
    pub fn new(minutes: Minutes) -> Self {
        Self {
            minutes,
            overrides: HashMap::new(),
        }
    }

    /// Override the leg `from -> to`.
    #[must_use]
    pub fn with_leg(mut self, from: &str, to: &str, minutes: Minutes) -> Self {
        self.overrides
            .insert((from.to_owned(), to.to_owned()), minutes);
        self
    }
}

impl TravelTimeEstimator for FixedTravelTimeEstimator {
    fn estimate(&self, from: &Location, to: &Location) -> Minutes {
        if from.name == to.name {
            return 0;
        }
        self.overrides
            .get(&(from.name.clone(), to.name.clone()))
            .copied()
            .unwrap_or(self.minutes)
    }
}

/// Deterministic first-fit routing.
///
/// Vehicles are filled in the order offered. Each vehicle repeatedly takes
/// the first feasible unvisited stop, trying mandatory stops before
/// droppable ones and earlier-closing windows first. Capacity, windows, the
/// horizon and the lunch break (no unloading, no driving) are all honoured.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySolver;

impl GreedySolver {
    fn candidate_order(problem: &RoundProblem) -> Vec<usize> {
        let mut nodes: Vec<usize> = problem.stops().collect();
        nodes.sort_by_key(|&node| {
            (
                !matches!(problem.requirement(node), NodeRequirement::Mandatory),
                problem.window(node).end,
                node,
            )
        });
        nodes
    }
}

impl RoutingSolver for GreedySolver {
    fn solve(
        &self,
        problem: &RoundProblem,
        _time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        let candidates = Self::candidate_order(problem);
        let mut visited = BTreeSet::new();
        let mut routes = Vec::new();

        for (index, vehicle) in problem.vehicles().iter().enumerate() {
            let mut clock = vehicle.earliest_start;
            let mut here = 0;
            let mut load = 0_u32;
            let mut stops = Vec::new();

            while let Some((node, arrival, departure)) =
                candidates.iter().copied().find_map(|node| {
                    if visited.contains(&node) {
                        return None;
                    }
                    if load.saturating_add(problem.demand(node)) > vehicle.capacity {
                        return None;
                    }
                    let arrival = problem.service_start(here, node, clock)?;
                    let departure = arrival.saturating_add(problem.service(node));
                    let back = problem.arrival(node, 0, departure);
                    (back <= problem.horizon()).then_some((node, arrival, departure))
                })
            {
                visited.insert(node);
                load = load.saturating_add(problem.demand(node));
                stops.push(RouteStop {
                    node,
                    arrival,
                    departure,
                    load,
                });
                clock = departure;
                here = node;
            }

            if !stops.is_empty() {
                routes.push(VehicleRoute {
                    vehicle: index,
                    departure: vehicle.earliest_start,
                    stops,
                    completion: problem.arrival(here, 0, clock),
                });
            }
        }

        let dropped = problem
            .stops()
            .filter(|node| !visited.contains(node))
            .collect();
        Ok(SolveOutcome::Solved(RoundSolution { routes, dropped }))
    }
}

/// Wraps a solver and reports [`SolveOutcome::NoSolution`] whenever a
/// mandatory node is left unvisited, like a backend that cannot drop
/// required stops.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictSolver<S>(pub S);

impl<S: RoutingSolver> RoutingSolver for StrictSolver<S> {
    fn solve(
        &self,
        problem: &RoundProblem,
        time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        match self.0.solve(problem, time_limit)? {
            SolveOutcome::Solved(solution)
                if solution.dropped.iter().any(|&node| {
                    matches!(problem.requirement(node), NodeRequirement::Mandatory)
                }) =>
            {
                Ok(SolveOutcome::NoSolution)
            }
            outcome => Ok(outcome),
        }
    }
}

/// Solver whose search never converges.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSolutionSolver;

impl RoutingSolver for NoSolutionSolver {
    fn solve(
        &self,
        _problem: &RoundProblem,
        _time_limit: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        Ok(SolveOutcome::NoSolution)
    }
}

/// A single-product (`diesel`) order delivered to a destination named after
/// the order.
#[must_use]
pub fn order(id: &str, quantity: u32, window: TimeWindow, priority: u8) -> Order {
    Order::new(id, id, window)
        .with_quantity("diesel", quantity)
        .with_priority(priority)
}

/// A `light` family truck.
#[must_use]
pub fn truck(id: &str, capacity: u32) -> Vehicle {
    Vehicle::new(id, "light", capacity)
}

/// A whole-order delivery to a destination named after the order.
#[must_use]
pub fn delivery(order_id: &str, quantity: u32, window: TimeWindow, priority: Priority) -> Delivery {
    Delivery {
        order_id: order_id.to_owned(),
        part: 1,
        parts: 1,
        destination: Location::named(order_id),
        quantity,
        window,
        priority,
    }
}
