//! Single-trip routing problem for one round.
//!
//! Node `0` is the depot; node `i > 0` is the `i - 1`-th pending delivery.
//! Service at a stop starts no earlier than the window start and strictly
//! before the window end; unloading then occupies the stop's service
//! minutes. Every vehicle leaves the depot no earlier than its own earliest
//! start and must be back by the horizon. Vehicles neither unload nor drive
//! during the lunch break.

use thiserror::Error;

use crate::{
    Delivery, LunchBreak, Minutes, PenaltyConfig, Priority, TimeWindow, TravelMatrix,
    TravelTimeError, TravelTimeEstimator,
};

/// Visit requirement of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRequirement {
    /// The depot; always part of every route.
    Depot,
    /// Must be visited.
    Mandatory,
    /// May be skipped at the given cost.
    Droppable {
        /// Cost of skipping the node.
        penalty: u64,
    },
}

/// A vehicle offered to the solver for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundVehicle {
    /// Fleet identifier.
    pub vehicle_id: String,
    /// Tank capacity.
    pub capacity: u32,
    /// Earliest minute the vehicle may leave the depot.
    pub earliest_start: Minutes,
}

/// Errors raised when a round problem violates its own invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// The travel matrix is not `n x n`.
    #[error("travel matrix must be {expected}x{expected}")]
    JaggedMatrix {
        /// Number of nodes.
        expected: usize,
    },
    /// A per-node vector disagrees with the node count.
    #[error("{field} has {actual} entries but the problem has {expected} nodes")]
    LengthMismatch {
        /// Name of the offending vector.
        field: &'static str,
        /// Number of nodes.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
    /// No vehicle was offered.
    #[error("a round needs at least one vehicle")]
    NoVehicles,
    /// The depot is missing from node 0.
    #[error("node 0 must be the depot")]
    MissingDepot,
    /// The travel matrix could not be built.
    #[error("travel matrix: {0}")]
    TravelTime(#[from] TravelTimeError),
}

/// Raw parts of a [`RoundProblem`], validated by [`RoundProblem::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundProblemParts {
    /// Node names, depot first.
    pub names: Vec<String>,
    /// Driving minutes between nodes.
    pub travel: TravelMatrix,
    /// Quantity dropped at each node.
    pub demands: Vec<u32>,
    /// Service-start window of each node.
    pub windows: Vec<TimeWindow>,
    /// Unloading minutes at each node.
    pub service: Vec<Minutes>,
    /// Visit requirement of each node.
    pub requirements: Vec<NodeRequirement>,
    /// Vehicles available this round, in preference order.
    pub vehicles: Vec<RoundVehicle>,
    /// Break during which no unloading may happen.
    pub lunch: Option<LunchBreak>,
    /// Latest return to the depot.
    pub horizon: Minutes,
    /// Cost standing in for an unvisited mandatory node.
    pub mandatory_penalty: u64,
}

/// A validated single-trip CVRPTW instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundProblem {
    parts: RoundProblemParts,
}

impl RoundProblem {
    /// Validate `parts`.
    ///
    /// # Errors
    ///
    /// Returns [`ProblemError`] when vectors disagree on the node count, the
    /// matrix is jagged, node 0 is not the depot or no vehicle is offered.
    pub fn new(parts: RoundProblemParts) -> Result<Self, ProblemError> {
        let expected = parts.names.len();
        let lengths = [
            ("demands", parts.demands.len()),
            ("windows", parts.windows.len()),
            ("service", parts.service.len()),
            ("requirements", parts.requirements.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(ProblemError::LengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        if parts.travel.len() != expected || parts.travel.iter().any(|row| row.len() != expected) {
            return Err(ProblemError::JaggedMatrix { expected });
        }
        if parts.requirements.first() != Some(&NodeRequirement::Depot) {
            return Err(ProblemError::MissingDepot);
        }
        if parts.vehicles.is_empty() {
            return Err(ProblemError::NoVehicles);
        }
        Ok(Self { parts })
    }

    /// Number of nodes including the depot.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.parts.names.len()
    }

    /// Indices of the delivery nodes.
    pub fn stops(&self) -> impl Iterator<Item = usize> {
        1..self.node_count()
    }

    /// Name of `node`.
    #[must_use]
    pub fn name(&self, node: usize) -> Option<&str> {
        self.parts.names.get(node).map(String::as_str)
    }

    /// Driving minutes from `from` to `to`; zero for unknown nodes.
    #[must_use]
    pub fn travel(&self, from: usize, to: usize) -> Minutes {
        self.parts
            .travel
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0)
    }

    /// Driving minutes to `to` plus unloading at `to`.
    #[must_use]
    pub fn transit(&self, from: usize, to: usize) -> Minutes {
        self.travel(from, to).saturating_add(self.service(to))
    }

    /// Quantity dropped at `node`.
    #[must_use]
    pub fn demand(&self, node: usize) -> u32 {
        self.parts.demands.get(node).copied().unwrap_or(0)
    }

    /// Service-start window of `node`.
    #[must_use]
    pub fn window(&self, node: usize) -> TimeWindow {
        self.parts
            .windows
            .get(node)
            .copied()
            .unwrap_or_else(TimeWindow::full_day)
    }

    /// Unloading minutes at `node`.
    #[must_use]
    pub fn service(&self, node: usize) -> Minutes {
        self.parts.service.get(node).copied().unwrap_or(0)
    }

    /// Visit requirement of `node`.
    #[must_use]
    pub fn requirement(&self, node: usize) -> NodeRequirement {
        self.parts
            .requirements
            .get(node)
            .copied()
            .unwrap_or(NodeRequirement::Depot)
    }

    /// Cost of leaving `node` unvisited.
    #[must_use]
    pub fn penalty(&self, node: usize) -> u64 {
        match self.requirement(node) {
            NodeRequirement::Depot => 0,
            NodeRequirement::Mandatory => self.parts.mandatory_penalty,
            NodeRequirement::Droppable { penalty } => penalty,
        }
    }

    /// Vehicles offered this round.
    #[must_use]
    pub fn vehicles(&self) -> &[RoundVehicle] {
        &self.parts.vehicles
    }

    /// Daily break, if configured.
    #[must_use]
    pub const fn lunch(&self) -> Option<LunchBreak> {
        self.parts.lunch
    }

    /// Latest return to the depot.
    #[must_use]
    pub const fn horizon(&self) -> Minutes {
        self.parts.horizon
    }

    /// Arrival at `to` for a vehicle leaving `from` at `departure`.
    ///
    /// A leg that would be on the road during lunch stops for the break.
    #[must_use]
    pub fn arrival(&self, from: usize, to: usize, departure: Minutes) -> Minutes {
        let travel = self.travel(from, to);
        let drive = self
            .lunch()
            .map_or(travel, |lunch| lunch.drive(departure, travel));
        departure.saturating_add(drive)
    }

    /// Earliest service start at `node` for a vehicle ready to drive at
    /// `ready` from `from`, honouring the window start and the lunch break.
    ///
    /// Returns `None` when the service cannot start before the window
    /// closes.
    #[must_use]
    pub fn service_start(&self, from: usize, node: usize, ready: Minutes) -> Option<Minutes> {
        let window = self.window(node);
        let mut start = self.arrival(from, node, ready).max(window.start);
        if let Some(lunch) = self.lunch()
            && lunch.overlaps(start, self.service(node).max(1))
        {
            start = start.max(lunch.end());
        }
        (start < window.end).then_some(start)
    }
}

/// Inputs that stay fixed while a family is scheduled.
#[derive(Debug, Clone, Copy)]
pub struct ProblemSettings<'a> {
    /// Unloading minutes per stop for the family.
    pub service_minutes: Minutes,
    /// Daily break.
    pub lunch: Option<LunchBreak>,
    /// Latest return to the depot.
    pub horizon: Minutes,
    /// Penalty weights.
    pub penalties: &'a PenaltyConfig,
}

/// Build the round problem for `deliveries` and `vehicles`.
///
/// # Errors
///
/// Returns [`ProblemError::NoVehicles`] for an empty fleet and propagates
/// travel-matrix failures.
pub fn build_round_problem<E: TravelTimeEstimator + ?Sized>(
    estimator: &E,
    depot: &crate::Location,
    deliveries: &[Delivery],
    vehicles: Vec<RoundVehicle>,
    settings: ProblemSettings<'_>,
) -> Result<RoundProblem, ProblemError> {
    let mut locations = Vec::with_capacity(deliveries.len() + 1);
    locations.push(depot.clone());
    locations.extend(deliveries.iter().map(|delivery| delivery.destination.clone()));
    let travel = estimator.travel_matrix(&locations)?;

    let mut demands = vec![0];
    let mut windows = vec![TimeWindow::full_day()];
    let mut service = vec![0];
    let mut requirements = vec![NodeRequirement::Depot];
    for delivery in deliveries {
        demands.push(delivery.quantity);
        windows.push(delivery.window);
        service.push(settings.service_minutes);
        requirements.push(match delivery.priority {
            Priority::Mandatory => NodeRequirement::Mandatory,
            Priority::Droppable { penalty_weight, .. } => NodeRequirement::Droppable {
                penalty: penalty_weight,
            },
        });
    }

    RoundProblem::new(RoundProblemParts {
        names: locations.into_iter().map(|location| location.name).collect(),
        travel,
        demands,
        windows,
        service,
        requirements,
        vehicles,
        lunch: settings.lunch,
        horizon: settings.horizon,
        mandatory_penalty: settings.penalties.mandatory,
    })
}
