//! `vrp-core` modelling helpers for `VrpRoutingSolver`.
//!
//! This module converts a [`RoundProblem`] into a `vrp-core` problem, runs
//! the search and translates the resulting tours back into core routes.
//! Times are expressed in minutes throughout. Lunch is split out of the
//! service windows and added to any leg that would be driven through it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tanker_core::{
    LunchBreak, Minutes, RoundProblem, RoundSolution, RouteStop, SolveError, SolveOutcome,
    VehicleRoute,
};
use vrp_core::models::common::{Location, Profile, TimeWindow};
use vrp_core::models::problem::{TravelTime, Vehicle as VrpVehicle};
use vrp_core::models::solution::Route as VrpRoute;
use vrp_core::prelude::*;

use crate::solver::VrpSolverConfig;

custom_dimension!(NodeIndex typeof usize);
custom_dimension!(VehicleIndex typeof usize);

fn invalid(message: String) -> SolveError {
    SolveError::InvalidProblem { message }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "penalties stay far below 2^52 so the conversion is exact"
)]
const fn penalty_cost(penalty: u64) -> f64 {
    penalty as f64
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "solver timestamps are clamped to the non-negative minute range first"
)]
fn to_minutes(value: f64) -> Minutes {
    if value >= f64::from(Minutes::MAX) {
        Minutes::MAX
    } else {
        value.max(0.0).round() as Minutes
    }
}

fn load_units(quantity: u32) -> Result<i32, SolveError> {
    i32::try_from(quantity).map_err(|_| invalid(format!("quantity {quantity} exceeds i32")))
}

/// Inclusive service-start windows for `node`, split around lunch.
///
/// `vrp-core` treats window ends as inclusive while the core model treats
/// them as exclusive, so the last usable minute is `end - 1`. An empty
/// result means the node can never be served.
pub(crate) fn service_windows(problem: &RoundProblem, node: usize) -> Vec<(Minutes, Minutes)> {
    let window = problem.window(node);
    let Some(last) = window.end.checked_sub(1) else {
        return Vec::new();
    };
    if window.start > last {
        return Vec::new();
    }
    let Some(lunch) = problem.lunch() else {
        return vec![(window.start, last)];
    };

    let service = problem.service(node).max(1);
    let mut pieces = Vec::with_capacity(2);
    if let Some(before) = lunch.start.checked_sub(service) {
        let latest = last.min(before);
        if window.start <= latest {
            pieces.push((window.start, latest));
        }
    }
    let earliest = window.start.max(lunch.end());
    if earliest <= last {
        pieces.push((earliest, last));
    }
    pieces
}

/// Matrix travel times with the lunch break applied to legs that would be
/// on the road during it.
struct MinuteTransportCost {
    minutes: Vec<Vec<Minutes>>,
    lunch: Option<LunchBreak>,
}

impl MinuteTransportCost {
    fn new(problem: &RoundProblem) -> Self {
        let nodes = problem.node_count();
        let minutes = (0..nodes)
            .map(|from| (0..nodes).map(|to| problem.travel(from, to)).collect())
            .collect();
        Self {
            minutes,
            lunch: problem.lunch(),
        }
    }

    fn lookup(&self, from: Location, to: Location) -> Minutes {
        let result = self.minutes.get(from).and_then(|row| row.get(to)).copied();
        debug_assert!(result.is_some(), "matrix lookup failed: from={from}, to={to}");
        result.unwrap_or(0)
    }

    fn driving(&self, from: Location, to: Location, travel_time: TravelTime) -> Minutes {
        let travel = self.lookup(from, to);
        self.lunch.map_or(travel, |lunch| match travel_time {
            TravelTime::Departure(departure) => lunch.drive(to_minutes(departure), travel),
            TravelTime::Arrival(arrival) => {
                lunch.drive(to_minutes(arrival).saturating_sub(travel), travel)
            }
        })
    }
}

impl TransportCost for MinuteTransportCost {
    fn distance(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        _departure: TravelTime,
    ) -> Cost {
        f64::from(self.lookup(from, to))
    }

    fn duration(
        &self,
        _route: &VrpRoute,
        from: Location,
        to: Location,
        travel_time: TravelTime,
    ) -> f64 {
        f64::from(self.driving(from, to, travel_time))
    }

    fn distance_approx(&self, profile: &Profile, from: usize, to: usize) -> f64 {
        self.duration_approx(profile, from, to)
    }

    fn duration_approx(&self, _profile: &Profile, from: usize, to: usize) -> f64 {
        f64::from(self.lookup(from, to))
    }
}

fn define_goal(
    transport: Arc<dyn TransportCost>,
    penalties: Arc<Vec<f64>>,
) -> GenericResult<GoalContext> {
    let minimize_unassigned = MinimizeUnassignedBuilder::new("min-unassigned")
        .set_job_estimator(move |_, job| {
            job.dimens()
                .get_node_index()
                .and_then(|node| penalties.get(*node))
                .copied()
                .unwrap_or(1.0)
        })
        .build()?;
    let capacity = CapacityFeatureBuilder::<SingleDimLoad>::new("capacity").build()?;
    let travel_time = TransportFeatureBuilder::new("min-travel-time")
        .set_transport_cost(transport)
        .set_time_constrained(true)
        .build_minimize_distance()?;

    GoalContextBuilder::with_features(&[minimize_unassigned, travel_time, capacity])?.build()
}

fn define_job(
    problem: &RoundProblem,
    node: usize,
    windows: &[(Minutes, Minutes)],
) -> GenericResult<Job> {
    let demand = load_units(problem.demand(node)).map_err(|err| err.to_string())?;
    SingleBuilder::default()
        .id(format!("node{node}").as_str())
        .demand(Demand::delivery(demand))
        .dimension(|dimens| {
            dimens.set_node_index(node);
        })
        .location(node)?
        .duration(f64::from(problem.service(node)))?
        .times(
            windows
                .iter()
                .map(|&(start, end)| TimeWindow::new(f64::from(start), f64::from(end)))
                .collect(),
        )?
        .build_as_job()
}

fn define_vehicles(problem: &RoundProblem) -> GenericResult<Vec<VrpVehicle>> {
    let horizon = f64::from(problem.horizon());
    problem
        .vehicles()
        .iter()
        .enumerate()
        .map(|(index, vehicle)| {
            let capacity = load_units(vehicle.capacity).map_err(|err| err.to_string())?;
            VehicleBuilder::default()
                .id(vehicle.vehicle_id.as_str())
                .add_detail(
                    VehicleDetailBuilder::default()
                        .set_start_location(0)
                        .set_start_time(f64::from(vehicle.earliest_start))
                        .set_end_location(0)
                        .set_end_time(horizon)
                        .build()?,
                )
                .capacity(SingleDimLoad::new(capacity))
                .dimension(|dimens| {
                    dimens.set_vehicle_index(index);
                })
                .build()
        })
        .collect()
}

/// Nodes offered to `vrp-core` with their windows, and nodes that can
/// never be served.
struct JobPlan {
    servable: Vec<(usize, Vec<(Minutes, Minutes)>)>,
    excluded: Vec<usize>,
}

fn plan_jobs(problem: &RoundProblem) -> JobPlan {
    let mut servable = Vec::new();
    let mut excluded = Vec::new();
    for node in problem.stops() {
        let windows = service_windows(problem, node);
        if windows.is_empty() {
            log::debug!(
                "node {node} ({}) has no usable service window",
                problem.name(node).unwrap_or("?")
            );
            excluded.push(node);
        } else {
            servable.push((node, windows));
        }
    }
    JobPlan { servable, excluded }
}

fn define_problem(problem: &RoundProblem, plan: &JobPlan) -> GenericResult<Problem> {
    let transport: Arc<dyn TransportCost> = Arc::new(MinuteTransportCost::new(problem));
    let penalties = Arc::new(
        (0..problem.node_count())
            .map(|node| penalty_cost(problem.penalty(node)))
            .collect::<Vec<_>>(),
    );
    let goal = define_goal(transport.clone(), penalties)?;
    let jobs = plan
        .servable
        .iter()
        .map(|(node, windows)| define_job(problem, *node, windows))
        .collect::<Result<Vec<_>, _>>()?;
    let vehicles = define_vehicles(problem)?;

    ProblemBuilder::default()
        .add_jobs(jobs.into_iter())
        .add_vehicles(vehicles.into_iter())
        .with_goal(goal)
        .with_transport_cost(transport)
        .build()
}

/// Run `vrp-core` on one round.
pub(crate) fn solve_round(
    problem: &RoundProblem,
    time_limit: Duration,
    config: &VrpSolverConfig,
) -> Result<SolveOutcome, SolveError> {
    let plan = plan_jobs(problem);
    if plan.servable.is_empty() {
        return Ok(SolveOutcome::Solved(RoundSolution {
            routes: Vec::new(),
            dropped: plan.excluded,
        }));
    }

    let vrp_problem =
        Arc::new(define_problem(problem, &plan).map_err(|err| invalid(err.to_string()))?);
    let max_time = usize::try_from(time_limit.as_secs().max(1)).unwrap_or(usize::MAX);
    let vrp_config = VrpConfigBuilder::new(vrp_problem.clone())
        .prebuild()
        .map_err(|err| invalid(err.to_string()))?
        .with_max_time(Some(max_time))
        .with_max_generations(Some(config.max_generations))
        .build()
        .map_err(|err| invalid(err.to_string()))?;

    let solution = match vrp_core::solver::Solver::new(vrp_problem, vrp_config).solve() {
        Ok(solution) => solution,
        Err(err) => {
            log::warn!("vrp-core search failed: {err}");
            return Ok(SolveOutcome::NoSolution);
        }
    };

    let mut routes = Vec::with_capacity(solution.routes.len());
    let mut visited = BTreeSet::new();
    for route in &solution.routes {
        if let Some(vehicle_route) = translate_route(route, problem)? {
            visited.extend(vehicle_route.stops.iter().map(|stop| stop.node));
            routes.push(vehicle_route);
        }
    }
    routes.sort_by_key(|route| route.vehicle);

    let dropped = problem
        .stops()
        .filter(|node| !visited.contains(node))
        .collect();
    Ok(SolveOutcome::Solved(RoundSolution { routes, dropped }))
}

fn translate_route(
    route: &VrpRoute,
    problem: &RoundProblem,
) -> Result<Option<VehicleRoute>, SolveError> {
    let vehicle = route
        .actor
        .vehicle
        .dimens
        .get_vehicle_index()
        .copied()
        .ok_or_else(|| invalid("route vehicle carries no index".to_owned()))?;

    let mut load = 0_u32;
    let mut stops = Vec::new();
    for activity in route.tour.all_activities() {
        let Some(single) = activity.job.as_ref() else {
            continue;
        };
        let node = single
            .dimens
            .get_node_index()
            .copied()
            .ok_or_else(|| invalid("routed job carries no node index".to_owned()))?;
        let departure = to_minutes(activity.schedule.departure);
        let service = problem.service(node);
        load = load.saturating_add(problem.demand(node));
        stops.push(RouteStop {
            node,
            arrival: departure.saturating_sub(service),
            departure,
            load,
        });
    }
    if stops.is_empty() {
        return Ok(None);
    }

    let departure = route
        .tour
        .start()
        .map_or(0, |start| to_minutes(start.schedule.departure));
    let completion = route
        .tour
        .end()
        .map_or(0, |end| to_minutes(end.schedule.arrival));
    Ok(Some(VehicleRoute {
        vehicle,
        departure,
        stops,
        completion,
    }))
}
