//! Core domain types and the multi-trip dispatch loop for fuel tankers.
//!
//! Orders are split by product family, each family is scheduled as a series
//! of single-trip rounds against an external routing solver, and vehicle
//! availability is carried from round to round. The solver and the
//! travel-time estimator are traits so backends and fakes plug in at the
//! same seams.

mod config;
mod fleet;
mod location;
mod order;
mod partition;
mod problem;
mod schedule;
mod scheduler;
mod solver;
pub mod travel_time;
mod vehicle;

pub use config::{
    DispatchConfig, EstimatorConfig, LunchBreak, NoProgressPolicy, PenaltyConfig, WorkdayConfig,
};
pub use fleet::{FleetState, TripReport, VehicleState};
pub use location::{Location, LocationBook};
pub use order::{MINUTES_PER_DAY, Minutes, Order, Priority, TimeWindow};
pub use partition::{
    Delivery, FamilyDemand, Partition, PartitionContext, PreferenceRule, ProductCatalog,
    partition_family,
};
pub use problem::{
    NodeRequirement, ProblemError, ProblemSettings, RoundProblem, RoundProblemParts,
    RoundVehicle, build_round_problem,
};
pub use schedule::{
    DispatchResult, FamilySchedule, RouteLeg, ScheduleStatus, ScheduledRoute, ScheduledStop,
    UnassignedOrder, UnassignedReason, VehicleReport,
};
pub use scheduler::{DispatchError, DispatchRequest, Scheduler, detail_route_legs};
pub use solver::{RoundSolution, RouteStop, RoutingSolver, SolveError, SolveOutcome, VehicleRoute};
pub use travel_time::{
    DistanceCache, DistanceMatrix, LayeredEstimator, MappingProvider, NoMappingProvider,
    TravelMatrix, TravelTimeError, TravelTimeEstimator, haversine_km,
};
pub use vehicle::{ProductFamily, Vehicle};

#[cfg(any(test, feature = "test-support"))]
#[doc(hidden)]
pub mod test_support;
