//! Multi-round dispatch loop.
//!
//! A fleet that returns to the depot and leaves again is modelled as a
//! sequence of single-trip rounds. Each round offers the vehicles that are
//! free before the cutoff to the [`RoutingSolver`], applies the returned
//! trips to the [`FleetState`] and removes the served deliveries from the
//! pending set. The loop ends when nothing is pending, no vehicle is free,
//! the round limit is hit or a round makes no progress.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    Delivery, DispatchConfig, DispatchResult, FamilyDemand, FamilySchedule, FleetState, Location,
    LocationBook, NoProgressPolicy, Order, Partition, PartitionContext, ProblemError,
    ProblemSettings, ProductFamily, RouteLeg, RoundVehicle, RoutingSolver, ScheduleStatus,
    ScheduledRoute, ScheduledStop, SolveError, SolveOutcome, TravelTimeEstimator, TripReport,
    UnassignedOrder, UnassignedReason, Vehicle, build_round_problem, partition_family,
};

/// Everything needed to dispatch one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Where every trip starts and ends.
    pub depot: Location,
    /// Destinations with known coordinates.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Orders to deliver.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Available trucks.
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
}

/// Errors returned by [`Scheduler::dispatch`].
///
/// Both variants signal broken internal contracts; infeasible demand is
/// reported through [`UnassignedOrder`]s instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A round problem could not be built.
    #[error(transparent)]
    Problem(#[from] ProblemError),
    /// The solver rejected a round or returned an inconsistent answer.
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Why a scheduling pass stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PassEnd {
    Exhausted,
    NoVehicle,
    RoundLimit,
    NoProgress,
}

impl PassEnd {
    const fn reason(self) -> UnassignedReason {
        match self {
            Self::NoProgress => UnassignedReason::NoProgress,
            Self::Exhausted | Self::NoVehicle | Self::RoundLimit => {
                UnassignedReason::TimeOrVehicleShortage
            }
        }
    }
}

/// Per-family inputs that stay fixed across rounds.
struct FamilyContext<'a> {
    family: &'a ProductFamily,
    depot: &'a Location,
    settings: ProblemSettings<'a>,
}

/// Routes accumulated for a family and the next round number.
struct FamilyRun {
    routes: Vec<ScheduledRoute>,
    next_round: u32,
}

/// Identifies a delivery across pending-set reshuffles.
type DeliveryKey = (String, u32);

fn key_of(delivery: &Delivery) -> DeliveryKey {
    (delivery.order_id.clone(), delivery.part)
}

/// Round-based multi-trip scheduler.
///
/// Generic over the travel-time estimator and the routing solver so tests
/// can substitute deterministic fakes.
///
/// # Examples
/// ```
/// use tanker_core::test_support::{FixedTravelTimeEstimator, GreedySolver, order, truck};
/// use tanker_core::{DispatchRequest, Location, Scheduler, ScheduleStatus, TimeWindow};
///
/// let scheduler = Scheduler::new(FixedTravelTimeEstimator::new(30), GreedySolver);
/// let request = DispatchRequest {
///     depot: Location::named("Depot"),
///     locations: Vec::new(),
///     orders: vec![order("A", 50, TimeWindow::new(420, 600), 1)],
///     vehicles: vec![truck("T1", 100)],
/// };
/// let result = scheduler.dispatch(&request)?;
/// let light = result.family("light").expect("light family is scheduled");
/// assert_eq!(light.status, ScheduleStatus::Success);
/// assert_eq!(light.routes.len(), 1);
/// # Ok::<(), tanker_core::DispatchError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scheduler<E, S> {
    estimator: E,
    solver: S,
    config: DispatchConfig,
}

impl<E, S> Scheduler<E, S>
where
    E: TravelTimeEstimator,
    S: RoutingSolver,
{
    /// Scheduler with default configuration.
    pub fn new(estimator: E, solver: S) -> Self {
        Self::with_config(estimator, solver, DispatchConfig::default())
    }

    /// Scheduler with explicit configuration.
    pub const fn with_config(estimator: E, solver: S, config: DispatchConfig) -> Self {
        Self {
            estimator,
            solver,
            config,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Schedule every product family in the request.
    ///
    /// Families are taken from the catalog and the vehicle list and
    /// processed in name order. Vehicle state is shared across families but
    /// each vehicle only ever serves its own.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] only when a round problem or a solver
    /// answer breaks its contract.
    pub fn dispatch(&self, request: &DispatchRequest) -> Result<DispatchResult, DispatchError> {
        let book = LocationBook::new(
            std::iter::once(request.depot.clone()).chain(request.locations.iter().cloned()),
        );
        let mut families: BTreeSet<ProductFamily> = self.config.catalog.families();
        families.extend(request.vehicles.iter().map(|vehicle| vehicle.family.clone()));

        let mut fleet = FleetState::new(&request.vehicles, self.config.workday.day_start);
        let mut schedules = Vec::with_capacity(families.len());
        for family in &families {
            let schedule = self.schedule_family(family, request, &book, &mut fleet)?;
            log::info!(
                "family {family}: {:?}, {} trips over {} rounds, {} unassigned",
                schedule.status,
                schedule.routes.len(),
                schedule.rounds_used(),
                schedule.unassigned.len()
            );
            schedules.push(schedule);
        }

        Ok(DispatchResult {
            families: schedules,
            fleet: fleet.report(),
        })
    }

    /// Schedule a single family against `fleet`.
    ///
    /// # Errors
    ///
    /// See [`Scheduler::dispatch`].
    pub fn schedule_family(
        &self,
        family: &ProductFamily,
        request: &DispatchRequest,
        book: &LocationBook,
        fleet: &mut FleetState,
    ) -> Result<FamilySchedule, DispatchError> {
        let partition = partition_family(
            family,
            &request.orders,
            &request.vehicles,
            PartitionContext {
                catalog: &self.config.catalog,
                penalties: &self.config.penalties,
                locations: book,
            },
        );
        let demand = match partition {
            Partition::Ready(demand) => demand,
            Partition::Skipped { rejected } => {
                log::debug!("family {family} skipped");
                return Ok(FamilySchedule::skipped(family.clone(), rejected));
            }
        };

        let workday = &self.config.workday;
        let ctx = FamilyContext {
            family,
            depot: &request.depot,
            settings: ProblemSettings {
                service_minutes: workday.service_for(family),
                lunch: workday.lunch,
                horizon: workday.day_close,
                penalties: &self.config.penalties,
            },
        };
        let mut run = FamilyRun {
            routes: Vec::new(),
            next_round: 1,
        };

        let FamilyDemand {
            deliveries,
            vehicles,
            mut rejected,
        } = demand;
        let mut pending = self.run_preference_passes(&ctx, &vehicles, deliveries, fleet, &mut run)?;
        let end = self.run_pass(&ctx, &vehicles, &mut pending, fleet, &mut run)?;
        if !pending.is_empty() {
            log::info!(
                "family {family}: {} deliveries left after {:?}",
                pending.len(),
                end
            );
        }
        rejected.extend(
            pending
                .iter()
                .map(|delivery| UnassignedOrder::from_delivery(delivery, end.reason())),
        );

        if self.config.detail_legs {
            for route in &mut run.routes {
                route.legs = detail_route_legs(&self.estimator, &request.depot, route, book);
            }
        }

        Ok(FamilySchedule {
            family: family.clone(),
            status: ScheduleStatus::Success,
            routes: run.routes,
            unassigned: rejected,
        })
    }

    /// Run each preference rule's pass and return what is still pending.
    fn run_preference_passes(
        &self,
        ctx: &FamilyContext<'_>,
        vehicles: &[Vehicle],
        deliveries: Vec<Delivery>,
        fleet: &mut FleetState,
        run: &mut FamilyRun,
    ) -> Result<Vec<Delivery>, DispatchError> {
        let mut pending = deliveries;
        for rule in &self.config.preferences {
            if run.next_round > self.config.workday.max_rounds {
                break;
            }
            let preferred: Vec<Vehicle> = vehicles
                .iter()
                .filter(|vehicle| rule.prefers(&vehicle.id))
                .cloned()
                .collect();
            if preferred.is_empty() {
                continue;
            }
            let (mut covered, rest): (Vec<Delivery>, Vec<Delivery>) = pending
                .into_iter()
                .partition(|delivery| rule.covers(&delivery.destination.name));
            pending = rest;
            if covered.is_empty() {
                continue;
            }
            log::debug!(
                "family {}: preference pass with {} vehicles for {} deliveries",
                ctx.family,
                preferred.len(),
                covered.len()
            );
            self.run_pass(ctx, &preferred, &mut covered, fleet, run)?;
            pending.extend(covered);
        }
        Ok(pending)
    }

    fn run_pass(
        &self,
        ctx: &FamilyContext<'_>,
        vehicles: &[Vehicle],
        pending: &mut Vec<Delivery>,
        fleet: &mut FleetState,
        run: &mut FamilyRun,
    ) -> Result<PassEnd, DispatchError> {
        let workday = &self.config.workday;
        while run.next_round <= workday.max_rounds {
            if pending.is_empty() {
                return Ok(PassEnd::Exhausted);
            }
            let round_vehicles = self.round_vehicles(vehicles, fleet);
            if round_vehicles.is_empty() {
                log::info!("family {}: no vehicle available before cutoff", ctx.family);
                return Ok(PassEnd::NoVehicle);
            }

            let mut served = self.solve_round(ctx, pending, &round_vehicles, fleet, run)?;
            if served.is_empty() && self.config.no_progress == NoProgressPolicy::RetryReachable {
                let reachable = self.reachable(ctx, pending, &round_vehicles);
                if !reachable.is_empty() && reachable.len() < pending.len() {
                    log::debug!(
                        "family {}: retrying round {} with {} reachable deliveries",
                        ctx.family,
                        run.next_round,
                        reachable.len()
                    );
                    served = self.solve_round(ctx, &reachable, &round_vehicles, fleet, run)?;
                }
            }
            if served.is_empty() {
                log::info!(
                    "family {}: round {} made no progress",
                    ctx.family,
                    run.next_round
                );
                return Ok(PassEnd::NoProgress);
            }

            pending.retain(|delivery| !served.contains(&key_of(delivery)));
            run.next_round = run.next_round.saturating_add(1);
        }
        Ok(if pending.is_empty() {
            PassEnd::Exhausted
        } else {
            PassEnd::RoundLimit
        })
    }

    /// Vehicles free before the cutoff, with starts moved out of lunch.
    fn round_vehicles(&self, vehicles: &[Vehicle], fleet: &FleetState) -> Vec<RoundVehicle> {
        let workday = &self.config.workday;
        fleet
            .available(vehicles, workday.round_cutoff())
            .into_iter()
            .filter_map(|vehicle| {
                let state = fleet.state(&vehicle.id)?;
                let earliest_start = workday
                    .lunch
                    .map_or(state.next_available, |lunch| lunch.push_out(state.next_available));
                Some(RoundVehicle {
                    vehicle_id: vehicle.id.clone(),
                    capacity: vehicle.capacity,
                    earliest_start,
                })
            })
            .collect()
    }

    /// Deliveries whose window can still be met by the earliest vehicle
    /// driving straight from the depot.
    fn reachable(
        &self,
        ctx: &FamilyContext<'_>,
        pending: &[Delivery],
        vehicles: &[RoundVehicle],
    ) -> Vec<Delivery> {
        let Some(earliest) = vehicles.iter().map(|vehicle| vehicle.earliest_start).min() else {
            return Vec::new();
        };
        pending
            .iter()
            .filter(|delivery| {
                let travel = self.estimator.estimate(ctx.depot, &delivery.destination);
                let drive = ctx
                    .settings
                    .lunch
                    .map_or(travel, |lunch| lunch.drive(earliest, travel));
                earliest.saturating_add(drive) < delivery.window.end
            })
            .cloned()
            .collect()
    }

    /// Build and solve one round, apply its trips and return the served
    /// deliveries.
    fn solve_round(
        &self,
        ctx: &FamilyContext<'_>,
        deliveries: &[Delivery],
        vehicles: &[RoundVehicle],
        fleet: &mut FleetState,
        run: &mut FamilyRun,
    ) -> Result<HashSet<DeliveryKey>, DispatchError> {
        let workday = &self.config.workday;
        let problem = build_round_problem(
            &self.estimator,
            ctx.depot,
            deliveries,
            vehicles.to_vec(),
            ctx.settings,
        )?;
        let solution = match self.solver.solve(&problem, workday.round_time_limit())? {
            SolveOutcome::Solved(solution) => solution,
            SolveOutcome::NoSolution => {
                log::debug!(
                    "family {}: no solution in round {}",
                    ctx.family,
                    run.next_round
                );
                return Ok(HashSet::new());
            }
        };

        let mut served = HashSet::new();
        let mut used = HashSet::new();
        for route in solution.routes {
            if route.stops.is_empty() {
                continue;
            }
            let vehicle = problem
                .vehicles()
                .get(route.vehicle)
                .ok_or(SolveError::UnknownVehicle {
                    index: route.vehicle,
                })?;
            if !used.insert(route.vehicle) {
                return Err(SolveError::InvalidProblem {
                    message: format!("vehicle {} routed twice in one round", vehicle.vehicle_id),
                }
                .into());
            }

            let mut stops = Vec::with_capacity(route.stops.len());
            for stop in &route.stops {
                let delivery = stop
                    .node
                    .checked_sub(1)
                    .and_then(|index| deliveries.get(index))
                    .ok_or_else(|| SolveError::InvalidProblem {
                        message: format!("route visits unknown node {}", stop.node),
                    })?;
                served.insert(key_of(delivery));
                stops.push(ScheduledStop {
                    order_id: delivery.order_id.clone(),
                    part: delivery.part,
                    parts: delivery.parts,
                    destination: delivery.destination.name.clone(),
                    arrival: stop.arrival,
                    departure: stop.departure,
                    quantity: delivery.quantity,
                    cumulative_load: stop.load,
                });
            }

            let total_load = route.total_load();
            fleet.record_trip(
                &vehicle.vehicle_id,
                TripReport {
                    completion: route.completion,
                    load: total_load,
                },
                workday.reload_minutes,
                workday.lunch,
            );
            run.routes.push(ScheduledRoute {
                round: run.next_round,
                vehicle_id: vehicle.vehicle_id.clone(),
                departure: route.departure,
                stops,
                total_load,
                completion: route.completion,
                legs: Vec::new(),
            });
        }

        if !solution.dropped.is_empty() {
            log::debug!(
                "family {}: round {} dropped {} nodes",
                ctx.family,
                run.next_round,
                solution.dropped.len()
            );
        }
        Ok(served)
    }
}

/// Per-leg travel minutes of a finished trip, depot to depot, using the
/// estimator's detailed lookup.
pub fn detail_route_legs<E: TravelTimeEstimator + ?Sized>(
    estimator: &E,
    depot: &Location,
    route: &ScheduledRoute,
    book: &LocationBook,
) -> Vec<RouteLeg> {
    let mut path = Vec::with_capacity(route.stops.len() + 2);
    path.push(depot.clone());
    path.extend(route.stops.iter().map(|stop| book.resolve(&stop.destination)));
    path.push(depot.clone());
    path.windows(2)
        .filter_map(|pair| match pair {
            [from, to] => Some(RouteLeg {
                from: from.name.clone(),
                to: to.name.clone(),
                minutes: estimator.estimate_detailed(from, to),
            }),
            _ => None,
        })
        .collect()
}
