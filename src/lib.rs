//! Facade crate for the tanker dispatch scheduler.
//!
//! This crate re-exports the core domain types and the dispatch loop, and
//! exposes the `vrp-core` routing backend and the data loaders behind
//! feature flags.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tanker_dispatch::{
//!     DispatchRequest, DistanceMatrix, LayeredEstimator, Location, Order, Scheduler,
//!     TimeWindow, Vehicle, VrpRoutingSolver,
//! };
//!
//! let request = DispatchRequest {
//!     depot: Location::named("Depot"),
//!     locations: Vec::new(),
//!     orders: vec![
//!         Order::new("A", "A", TimeWindow::new(420, 600)).with_quantity("diesel", 40),
//!     ],
//!     vehicles: vec![Vehicle::new("T1", "light", 100)],
//! };
//! let estimator = LayeredEstimator::new(Arc::new(DistanceMatrix::default()));
//! let result = Scheduler::new(estimator, VrpRoutingSolver::new()).dispatch(&request)?;
//! assert_eq!(result.fleet.len(), 1);
//! # Ok::<(), tanker_dispatch::DispatchError>(())
//! ```

#![forbid(unsafe_code)]

pub use tanker_core::{
    Delivery, DispatchConfig, DispatchError, DispatchRequest, DispatchResult, DistanceCache,
    DistanceMatrix, EstimatorConfig, FamilySchedule, LayeredEstimator, Location, LunchBreak,
    MappingProvider, Minutes, NoMappingProvider, NoProgressPolicy, Order, PenaltyConfig,
    PreferenceRule, Priority, ProductCatalog, ProductFamily, RoundProblem, RoundSolution,
    RoutingSolver, ScheduleStatus, ScheduledRoute, ScheduledStop, Scheduler, SolveError,
    SolveOutcome, TimeWindow, TravelTimeError, TravelTimeEstimator, UnassignedOrder,
    UnassignedReason, Vehicle, VehicleReport, WorkdayConfig,
};

#[cfg(feature = "test-support")]
#[doc(hidden)]
pub use tanker_core::test_support;

#[cfg(feature = "solver-vrp")]
pub use tanker_solver_vrp::{VrpRoutingSolver, VrpSolverConfig};

#[cfg(feature = "data")]
pub use tanker_data::routing::{OsrmMappingProvider, OsrmMappingProviderConfig};
#[cfg(feature = "data")]
pub use tanker_data::{MatrixLoadError, load_distance_matrix};
