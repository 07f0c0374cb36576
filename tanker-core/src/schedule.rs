//! Dispatch output: routes per round, unassigned orders and fleet state.

use serde::{Deserialize, Serialize};

use crate::{Delivery, Minutes, Order, ProductFamily};

/// One visit on a scheduled trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledStop {
    /// Order served.
    pub order_id: String,
    /// Part of the order carried on this trip.
    pub part: u32,
    /// Number of parts the order was split into.
    pub parts: u32,
    /// Destination name.
    pub destination: String,
    /// Minute unloading starts.
    pub arrival: Minutes,
    /// Minute the truck leaves.
    pub departure: Minutes,
    /// Quantity dropped.
    pub quantity: u32,
    /// Load delivered so far on this trip, including this stop.
    pub cumulative_load: u32,
}

/// Travel time of one leg of a finished trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Leg origin.
    pub from: String,
    /// Leg destination.
    pub to: String,
    /// Driving minutes.
    pub minutes: Minutes,
}

/// A depot-to-depot trip made by one vehicle in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRoute {
    /// One-based round number within the family.
    pub round: u32,
    /// Vehicle identifier.
    pub vehicle_id: String,
    /// Minute the vehicle leaves the depot.
    pub departure: Minutes,
    /// Stops in visiting order.
    pub stops: Vec<ScheduledStop>,
    /// Total quantity delivered.
    pub total_load: u32,
    /// Minute the vehicle is back at the depot.
    pub completion: Minutes,
    /// Per-leg travel times, when detailed lookups are enabled.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<RouteLeg>,
}

/// Why an order (or part of one) was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnassignedReason {
    /// Rounds or vehicles ran out before the order was served.
    #[serde(rename = "time/vehicle shortage")]
    TimeOrVehicleShortage,
    /// A round assigned nothing and the pass stopped.
    #[serde(rename = "no progress")]
    NoProgress,
    /// The order's window admits no visit.
    #[serde(rename = "invalid window")]
    InvalidWindow,
    /// No vehicle carries the order's family.
    #[serde(rename = "no vehicle")]
    NoVehicle,
}

/// An undelivered order or order part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedOrder {
    /// Order identifier.
    pub order_id: String,
    /// Part left undelivered.
    pub part: u32,
    /// Number of parts the order was split into.
    pub parts: u32,
    /// Destination name.
    pub destination: String,
    /// Undelivered quantity.
    pub quantity: u32,
    /// Priority level from the request.
    pub priority: u8,
    /// Why it was not delivered.
    pub reason: UnassignedReason,
}

impl UnassignedOrder {
    /// Report a whole order that never became a delivery.
    #[must_use]
    pub fn whole(order: &Order, quantity: u32, reason: UnassignedReason) -> Self {
        Self {
            order_id: order.id.clone(),
            part: 1,
            parts: 1,
            destination: order.destination.clone(),
            quantity,
            priority: order.priority,
            reason,
        }
    }

    /// Report a pending delivery.
    #[must_use]
    pub fn from_delivery(delivery: &Delivery, reason: UnassignedReason) -> Self {
        Self {
            order_id: delivery.order_id.clone(),
            part: delivery.part,
            parts: delivery.parts,
            destination: delivery.destination.name.clone(),
            quantity: delivery.quantity,
            priority: delivery.priority.level(),
            reason,
        }
    }
}

/// Whether a family was scheduled at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    /// The scheduling loop ran.
    Success,
    /// The family had no pending order or no vehicle.
    Skipped,
}

/// Schedule for one product family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySchedule {
    /// Family scheduled.
    pub family: ProductFamily,
    /// Outcome.
    pub status: ScheduleStatus,
    /// Trips in round order.
    pub routes: Vec<ScheduledRoute>,
    /// Orders not delivered.
    pub unassigned: Vec<UnassignedOrder>,
}

impl FamilySchedule {
    /// A skipped family with no routes.
    #[must_use]
    pub fn skipped(family: ProductFamily, unassigned: Vec<UnassignedOrder>) -> Self {
        Self {
            family,
            status: ScheduleStatus::Skipped,
            routes: Vec::new(),
            unassigned,
        }
    }

    /// Number of rounds that produced at least one trip.
    #[must_use]
    pub fn rounds_used(&self) -> u32 {
        self.routes.iter().map(|route| route.round).max().unwrap_or(0)
    }
}

/// Final state of one vehicle after dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReport {
    /// Vehicle identifier.
    pub vehicle_id: String,
    /// Family carried.
    pub family: ProductFamily,
    /// Minute the vehicle could leave again.
    pub next_available: Minutes,
    /// Quantity delivered over the day.
    pub cumulative_workload: u64,
    /// Trips made.
    pub trips: u32,
}

/// Full dispatch output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// One schedule per family, in family order.
    pub families: Vec<FamilySchedule>,
    /// Final state of every vehicle, in request order.
    pub fleet: Vec<VehicleReport>,
}

impl DispatchResult {
    /// Schedule for `family`, if it was considered.
    #[must_use]
    pub fn family(&self, family: &str) -> Option<&FamilySchedule> {
        self.families
            .iter()
            .find(|schedule| schedule.family.as_str() == family)
    }
}
