//! Per-vehicle availability carried from one round to the next.

use std::collections::HashMap;

use crate::{LunchBreak, Minutes, Vehicle, VehicleReport};

/// Mutable state of one vehicle across rounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleState {
    /// Minute the vehicle may next leave the depot.
    pub next_available: Minutes,
    /// Quantity delivered so far; only biases vehicle ordering.
    pub cumulative_workload: u64,
    /// Trips completed.
    pub trips: u32,
}

/// Outcome of one trip, folded back into [`FleetState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripReport {
    /// Minute the vehicle returned to the depot.
    pub completion: Minutes,
    /// Quantity delivered.
    pub load: u32,
}

/// Availability of every vehicle in the request.
///
/// # Examples
/// ```
/// use tanker_core::{FleetState, LunchBreak, TripReport, Vehicle};
///
/// let vehicles = [Vehicle::new("T1", "light", 100)];
/// let mut fleet = FleetState::new(&vehicles, 420);
/// fleet.record_trip("T1", TripReport { completion: 700, load: 60 }, 30, Some(LunchBreak::default()));
/// // 700 + 30 lands inside lunch and is pushed to its end.
/// assert_eq!(fleet.state("T1").map(|s| s.next_available), Some(780));
/// ```
#[derive(Debug, Clone)]
pub struct FleetState {
    order: Vec<Vehicle>,
    states: HashMap<String, VehicleState>,
}

impl FleetState {
    /// Every vehicle available from `day_start` with no workload.
    #[must_use]
    pub fn new(vehicles: &[Vehicle], day_start: Minutes) -> Self {
        let states = vehicles
            .iter()
            .map(|vehicle| {
                (
                    vehicle.id.clone(),
                    VehicleState {
                        next_available: day_start,
                        cumulative_workload: 0,
                        trips: 0,
                    },
                )
            })
            .collect();
        Self {
            order: vehicles.to_vec(),
            states,
        }
    }

    /// State of `vehicle_id`, if tracked.
    #[must_use]
    pub fn state(&self, vehicle_id: &str) -> Option<&VehicleState> {
        self.states.get(vehicle_id)
    }

    /// Vehicles among `candidates` free strictly before `cutoff`, least
    /// loaded first with ties broken by identifier.
    #[must_use]
    pub fn available<'a>(&self, candidates: &'a [Vehicle], cutoff: Minutes) -> Vec<&'a Vehicle> {
        let mut ready: Vec<(&Vehicle, &VehicleState)> = candidates
            .iter()
            .filter_map(|vehicle| self.states.get(&vehicle.id).map(|state| (vehicle, state)))
            .filter(|(_, state)| state.next_available < cutoff)
            .collect();
        ready.sort_by(|(a, sa), (b, sb)| {
            sa.cumulative_workload
                .cmp(&sb.cumulative_workload)
                .then_with(|| a.id.cmp(&b.id))
        });
        ready.into_iter().map(|(vehicle, _)| vehicle).collect()
    }

    /// Fold a finished trip into the vehicle's state.
    ///
    /// The vehicle is free again after `reload_minutes`; a time inside the
    /// lunch break is moved to exactly the end of the break.
    pub fn record_trip(
        &mut self,
        vehicle_id: &str,
        trip: TripReport,
        reload_minutes: Minutes,
        lunch: Option<LunchBreak>,
    ) {
        let Some(state) = self.states.get_mut(vehicle_id) else {
            log::warn!("ignoring trip for untracked vehicle {vehicle_id}");
            debug_assert!(false, "trip recorded for untracked vehicle {vehicle_id}");
            return;
        };
        let ready = trip.completion.saturating_add(reload_minutes);
        state.next_available = lunch.map_or(ready, |lunch| lunch.push_out(ready));
        state.cumulative_workload = state.cumulative_workload.saturating_add(u64::from(trip.load));
        state.trips = state.trips.saturating_add(1);
    }

    /// Final state of every vehicle, in request order.
    #[must_use]
    pub fn report(&self) -> Vec<VehicleReport> {
        self.order
            .iter()
            .filter_map(|vehicle| {
                self.states.get(&vehicle.id).map(|state| VehicleReport {
                    vehicle_id: vehicle.id.clone(),
                    family: vehicle.family.clone(),
                    next_available: state.next_available,
                    cumulative_workload: state.cumulative_workload,
                    trips: state.trips,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn vehicles() -> Vec<Vehicle> {
        vec![
            Vehicle::new("T2", "light", 100),
            Vehicle::new("T1", "light", 100),
            Vehicle::new("T3", "light", 100),
        ]
    }

    #[rstest]
    fn orders_by_workload_then_id(vehicles: Vec<Vehicle>) {
        let mut fleet = FleetState::new(&vehicles, 420);
        fleet.record_trip("T1", TripReport { completion: 500, load: 40 }, 30, None);
        let ids: Vec<&str> = fleet
            .available(&vehicles, 1020)
            .into_iter()
            .map(|vehicle| vehicle.id.as_str())
            .collect();
        assert_eq!(ids, vec!["T2", "T3", "T1"]);
    }

    #[rstest]
    fn cutoff_is_exclusive(vehicles: Vec<Vehicle>) {
        let mut fleet = FleetState::new(&vehicles, 420);
        fleet.record_trip("T1", TripReport { completion: 990, load: 10 }, 30, None);
        let ids: Vec<&str> = fleet
            .available(&vehicles, 1020)
            .into_iter()
            .map(|vehicle| vehicle.id.as_str())
            .collect();
        assert_eq!(ids, vec!["T2", "T3"]);
    }

    #[rstest]
    #[case(500, 530)]
    #[case(690, 780)]
    #[case(749, 780)]
    #[case(750, 780)]
    #[case(760, 790)]
    fn next_available_skips_lunch(
        vehicles: Vec<Vehicle>,
        #[case] completion: Minutes,
        #[case] expected: Minutes,
    ) {
        let mut fleet = FleetState::new(&vehicles, 420);
        fleet.record_trip(
            "T2",
            TripReport { completion, load: 10 },
            30,
            Some(LunchBreak::default()),
        );
        let state = fleet.state("T2").expect("tracked vehicle");
        assert_eq!(state.next_available, expected);
        assert_eq!(state.trips, 1);
        assert_eq!(state.cumulative_workload, 10);
    }

    #[rstest]
    fn report_keeps_request_order(vehicles: Vec<Vehicle>) {
        let fleet = FleetState::new(&vehicles, 420);
        let ids: Vec<String> = fleet.report().into_iter().map(|r| r.vehicle_id).collect();
        assert_eq!(ids, vec!["T2", "T1", "T3"]);
    }
}
