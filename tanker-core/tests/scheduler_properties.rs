//! Property-based tests for the dispatch loop.
//!
//! Random order books are dispatched with the greedy test solver and the
//! result is checked against the guarantees every schedule must keep:
//!
//! - **Capacity:** no trip carries more than its truck holds.
//! - **Windows:** unloading starts inside the order window and never
//!   overlaps lunch.
//! - **One trip per round:** a truck appears at most once in a round.
//! - **Reload:** a truck leaves again only after returning and reloading.
//! - **Conservation:** every unit ordered is delivered or reported.
//! - **Mandatory service:** a priority-1 order that an idle truck can serve
//!   on its own is always scheduled.
//! - **Determinism:** the same request yields the same schedule.

use std::collections::{BTreeMap, HashMap, HashSet};

use proptest::prelude::*;
use tanker_core::test_support::{FixedTravelTimeEstimator, GreedySolver, order, truck};
use tanker_core::{
    DispatchConfig, DispatchRequest, DispatchResult, Location, Scheduler, TimeWindow,
};

#[derive(Debug, Clone)]
struct OrderSpec {
    quantity: u32,
    start: u32,
    length: u32,
    priority: u8,
}

fn order_strategy() -> impl Strategy<Value = OrderSpec> {
    (1_u32..=160, 420_u32..=900, 30_u32..=300, 1_u8..=4).prop_map(
        |(quantity, start, length, priority)| OrderSpec {
            quantity,
            start,
            length,
            priority,
        },
    )
}

/// Priority-1 orders any idle truck can serve before lunch: the load fits
/// the smallest tank and the window stays open past the first arrival.
fn mandatory_order_strategy() -> impl Strategy<Value = OrderSpec> {
    (1_u32..=40, 420_u32..=600, 60_u32..=400).prop_map(|(quantity, start, length)| OrderSpec {
        quantity,
        start,
        length,
        priority: 1,
    })
}

fn build_request(orders: &[OrderSpec], capacities: &[u32]) -> DispatchRequest {
    DispatchRequest {
        depot: Location::named("Depot"),
        locations: Vec::new(),
        orders: orders
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let end = spec.start.saturating_add(spec.length).min(1080);
                order(
                    &format!("O{index}"),
                    spec.quantity,
                    TimeWindow::new(spec.start, end),
                    spec.priority,
                )
            })
            .collect(),
        vehicles: capacities
            .iter()
            .enumerate()
            .map(|(index, &capacity)| truck(&format!("T{index}"), capacity))
            .collect(),
    }
}

fn dispatch(request: &DispatchRequest, travel: u32) -> DispatchResult {
    Scheduler::new(FixedTravelTimeEstimator::new(travel), GreedySolver)
        .dispatch(request)
        .expect("dispatch should not fail")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trips_respect_capacity(
        orders in prop::collection::vec(order_strategy(), 1..8),
        capacities in prop::collection::vec(40_u32..=150, 1..4),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        let capacity_of: HashMap<String, u32> = request
            .vehicles
            .iter()
            .map(|vehicle| (vehicle.id.clone(), vehicle.capacity))
            .collect();
        let result = dispatch(&request, travel);
        for route in result.families.iter().flat_map(|family| &family.routes) {
            let carried: u32 = route.stops.iter().map(|stop| stop.quantity).sum();
            prop_assert_eq!(carried, route.total_load);
            prop_assert!(route.total_load <= capacity_of[&route.vehicle_id]);
        }
    }

    #[test]
    fn unloading_stays_inside_windows_and_outside_lunch(
        orders in prop::collection::vec(order_strategy(), 1..8),
        capacities in prop::collection::vec(40_u32..=150, 1..4),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        let windows: HashMap<String, TimeWindow> = request
            .orders
            .iter()
            .map(|order| (order.id.clone(), order.window))
            .collect();
        let config = DispatchConfig::default();
        let lunch = config.workday.lunch.expect("default workday has lunch");
        let result = dispatch(&request, travel);
        for route in result.families.iter().flat_map(|family| &family.routes) {
            prop_assert!(route.completion <= config.workday.day_close);
            for stop in &route.stops {
                let window = windows[&stop.order_id];
                prop_assert!(window.start <= stop.arrival && stop.arrival < window.end);
                prop_assert!(!lunch.overlaps(stop.arrival, stop.departure - stop.arrival));
            }
        }
    }

    #[test]
    fn trucks_make_one_trip_per_round_and_reload_between(
        orders in prop::collection::vec(order_strategy(), 1..8),
        capacities in prop::collection::vec(40_u32..=150, 1..4),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        let reload = DispatchConfig::default().workday.reload_minutes;
        let result = dispatch(&request, travel);
        for family in &result.families {
            let mut seen = HashSet::new();
            let mut last_return: HashMap<&str, u32> = HashMap::new();
            for route in &family.routes {
                prop_assert!(seen.insert((route.round, route.vehicle_id.as_str())));
                if let Some(&back) = last_return.get(route.vehicle_id.as_str()) {
                    prop_assert!(route.departure >= back + reload);
                }
                last_return.insert(&route.vehicle_id, route.completion);
            }
        }
    }

    #[test]
    fn every_unit_is_delivered_or_reported(
        orders in prop::collection::vec(order_strategy(), 1..8),
        capacities in prop::collection::vec(40_u32..=150, 1..4),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        let result = dispatch(&request, travel);
        let mut accounted: BTreeMap<String, u32> = BTreeMap::new();
        for family in &result.families {
            for stop in family.routes.iter().flat_map(|route| &route.stops) {
                *accounted.entry(stop.order_id.clone()).or_default() += stop.quantity;
            }
            for unassigned in &family.unassigned {
                *accounted.entry(unassigned.order_id.clone()).or_default() += unassigned.quantity;
            }
        }
        for order in &request.orders {
            prop_assert_eq!(accounted.get(&order.id).copied(), Some(order.quantities["diesel"]));
        }
    }

    #[test]
    fn dispatch_is_deterministic(
        orders in prop::collection::vec(order_strategy(), 1..8),
        capacities in prop::collection::vec(40_u32..=150, 1..4),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        prop_assert_eq!(dispatch(&request, travel), dispatch(&request, travel));
    }

    #[test]
    fn feasible_mandatory_orders_are_never_dropped(
        orders in prop::collection::vec(mandatory_order_strategy(), 1..6),
        capacities in prop::collection::vec(40_u32..=150, 6..9),
        travel in 10_u32..=45,
    ) {
        let request = build_request(&orders, &capacities);
        let result = dispatch(&request, travel);
        let unassigned: Vec<&str> = result
            .families
            .iter()
            .flat_map(|family| &family.unassigned)
            .map(|unassigned| unassigned.order_id.as_str())
            .collect();
        prop_assert!(unassigned.is_empty(), "dropped {:?}", unassigned);

        let served: HashSet<&str> = result
            .families
            .iter()
            .flat_map(|family| &family.routes)
            .flat_map(|route| &route.stops)
            .map(|stop| stop.order_id.as_str())
            .collect();
        for order in &request.orders {
            prop_assert!(served.contains(order.id.as_str()), "{} not served", order.id);
        }
    }
}
