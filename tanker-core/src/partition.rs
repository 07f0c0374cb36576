//! Split a request into independent per-family demand.
//!
//! Vehicles carry a single product family, so each family is scheduled on
//! its own. Orders contribute the summed quantity of their products in that
//! family; quantities larger than any truck in the family are cut into
//! truck-sized parts.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    Location, LocationBook, Order, PenaltyConfig, Priority, ProductFamily, TimeWindow,
    UnassignedOrder, UnassignedReason, Vehicle,
};

/// Maps product names onto the family of truck that carries them.
///
/// # Examples
/// ```
/// use tanker_core::{Order, ProductCatalog, ProductFamily, TimeWindow};
///
/// let catalog = ProductCatalog::default();
/// let order = Order::new("A", "North", TimeWindow::full_day())
///     .with_quantity("gasoline", 30)
///     .with_quantity("diesel", 20)
///     .with_quantity("heavy_oil", 5);
/// assert_eq!(catalog.family_quantity(&order, &ProductFamily::new("light")), 50);
/// assert_eq!(catalog.family_quantity(&order, &ProductFamily::new("heavy")), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCatalog {
    products: BTreeMap<String, ProductFamily>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new([
            ("gasoline", "light"),
            ("diesel", "light"),
            ("kerosene", "light"),
            ("heavy_oil", "heavy"),
        ])
    }
}

impl ProductCatalog {
    /// Build a catalog from `(product, family)` pairs.
    pub fn new<I, P, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, F)>,
        P: Into<String>,
        F: Into<ProductFamily>,
    {
        Self {
            products: entries
                .into_iter()
                .map(|(product, family)| (product.into(), family.into()))
                .collect(),
        }
    }

    /// Family of `product`, if known.
    #[must_use]
    pub fn family_of(&self, product: &str) -> Option<&ProductFamily> {
        self.products.get(product)
    }

    /// Every family the catalog mentions.
    #[must_use]
    pub fn families(&self) -> BTreeSet<ProductFamily> {
        self.products.values().cloned().collect()
    }

    /// Sum of `order`'s quantities whose product belongs to `family`.
    ///
    /// Unknown products are ignored.
    #[must_use]
    pub fn family_quantity(&self, order: &Order, family: &ProductFamily) -> u32 {
        order
            .quantities
            .iter()
            .filter(|(product, _)| match self.family_of(product) {
                Some(candidate) => candidate == family,
                None => {
                    log::debug!("order {} requests unknown product {product}", order.id);
                    false
                }
            })
            .fold(0_u32, |total, (_, quantity)| total.saturating_add(*quantity))
    }
}

/// Route orders for some destinations to a preferred set of vehicles first.
///
/// Preference passes run before the general pass; whatever they leave
/// pending falls back to the general pool.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreferenceRule {
    /// Destination names the rule applies to.
    pub destinations: BTreeSet<String>,
    /// Vehicle identifiers to try first.
    pub vehicles: BTreeSet<String>,
}

impl PreferenceRule {
    /// Whether deliveries to `destination` are covered by this rule.
    #[must_use]
    pub fn covers(&self, destination: &str) -> bool {
        self.destinations.contains(destination)
    }

    /// Whether `vehicle_id` is one of the preferred vehicles.
    #[must_use]
    pub fn prefers(&self, vehicle_id: &str) -> bool {
        self.vehicles.contains(vehicle_id)
    }
}

/// A single truckload for one family: a whole order or one part of an
/// oversized order.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Parent order identifier.
    pub order_id: String,
    /// One-based part number.
    pub part: u32,
    /// Number of parts the order was split into.
    pub parts: u32,
    /// Resolved destination.
    pub destination: Location,
    /// Quantity to drop.
    pub quantity: u32,
    /// Visit window inherited from the order.
    pub window: TimeWindow,
    /// Visit guarantee inherited from the order.
    pub priority: Priority,
}

/// Demand for one family, ready for scheduling.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyDemand {
    /// Deliveries to schedule.
    pub deliveries: Vec<Delivery>,
    /// Vehicles of the family.
    pub vehicles: Vec<Vehicle>,
    /// Orders rejected before scheduling.
    pub rejected: Vec<UnassignedOrder>,
}

/// Result of partitioning a request for one family.
#[derive(Debug, Clone, PartialEq)]
pub enum Partition {
    /// There is work and a fleet to do it.
    Ready(FamilyDemand),
    /// Nothing to schedule; `rejected` lists orders that could not be sent.
    Skipped {
        /// Orders reported unassigned.
        rejected: Vec<UnassignedOrder>,
    },
}

/// Inputs shared by every family's partition.
#[derive(Debug, Clone, Copy)]
pub struct PartitionContext<'a> {
    /// Product-to-family mapping.
    pub catalog: &'a ProductCatalog,
    /// Priority classification.
    pub penalties: &'a PenaltyConfig,
    /// Known locations.
    pub locations: &'a LocationBook,
}

/// Select the orders and vehicles of `family`.
///
/// The family is skipped when it has no pending order or no vehicle. Orders
/// with an empty window never reach the solver.
#[must_use]
pub fn partition_family(
    family: &ProductFamily,
    orders: &[Order],
    vehicles: &[Vehicle],
    ctx: PartitionContext<'_>,
) -> Partition {
    let pending: Vec<(&Order, u32)> = orders
        .iter()
        .map(|order| (order, ctx.catalog.family_quantity(order, family)))
        .filter(|(_, quantity)| *quantity > 0)
        .collect();
    let fleet: Vec<Vehicle> = vehicles
        .iter()
        .filter(|vehicle| &vehicle.family == family)
        .cloned()
        .collect();

    if pending.is_empty() {
        return Partition::Skipped {
            rejected: Vec::new(),
        };
    }

    let max_capacity = fleet.iter().map(|vehicle| vehicle.capacity).max().unwrap_or(0);
    if max_capacity == 0 {
        log::info!("family {family} has orders but no usable vehicle");
        let rejected = pending
            .iter()
            .map(|(order, quantity)| {
                UnassignedOrder::whole(order, *quantity, UnassignedReason::NoVehicle)
            })
            .collect();
        return Partition::Skipped { rejected };
    }

    let mut deliveries = Vec::new();
    let mut rejected = Vec::new();
    for (order, quantity) in pending {
        if order.window.is_empty() {
            rejected.push(UnassignedOrder::whole(
                order,
                quantity,
                UnassignedReason::InvalidWindow,
            ));
            continue;
        }
        let destination = ctx.locations.resolve(&order.destination);
        let priority = ctx.penalties.classify(order.priority);
        deliveries.extend(split_quantity(quantity, max_capacity).enumerate().map(
            |(index, part_quantity)| Delivery {
                order_id: order.id.clone(),
                part: u32::try_from(index).map_or(u32::MAX, |i| i + 1),
                parts: quantity.div_ceil(max_capacity),
                destination: destination.clone(),
                quantity: part_quantity,
                window: order.window,
                priority,
            },
        ));
    }

    if deliveries.is_empty() {
        return Partition::Skipped { rejected };
    }
    Partition::Ready(FamilyDemand {
        deliveries,
        vehicles: fleet,
        rejected,
    })
}

/// Chunks of at most `limit` summing to `quantity`.
fn split_quantity(quantity: u32, limit: u32) -> impl Iterator<Item = u32> {
    let mut remaining = quantity;
    std::iter::from_fn(move || {
        if remaining == 0 {
            return None;
        }
        let chunk = remaining.min(limit);
        remaining -= chunk;
        Some(chunk)
    })
}
