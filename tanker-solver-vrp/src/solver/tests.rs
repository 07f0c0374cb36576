//! Tests for the `VrpRoutingSolver`.

use super::*;
use rstest::{fixture, rstest};
use tanker_core::test_support::{FixedTravelTimeEstimator, delivery};
use tanker_core::{
    Delivery, Location, LunchBreak, Minutes, PenaltyConfig, Priority, ProblemSettings,
    RoundSolution, RoundVehicle, TimeWindow, build_round_problem,
};

#[fixture]
fn solver() -> VrpRoutingSolver {
    VrpRoutingSolver::with_config(VrpSolverConfig {
        max_generations: 100,
    })
}

fn vehicle(id: &str, capacity: u32, earliest_start: Minutes) -> RoundVehicle {
    RoundVehicle {
        vehicle_id: id.to_owned(),
        capacity,
        earliest_start,
    }
}

fn solve(
    solver: &VrpRoutingSolver,
    deliveries: &[Delivery],
    vehicles: Vec<RoundVehicle>,
) -> (RoundProblem, RoundSolution) {
    solve_with_travel(solver, 30, deliveries, vehicles)
}

fn solve_with_travel(
    solver: &VrpRoutingSolver,
    travel: Minutes,
    deliveries: &[Delivery],
    vehicles: Vec<RoundVehicle>,
) -> (RoundProblem, RoundSolution) {
    let penalties = PenaltyConfig::default();
    let problem = build_round_problem(
        &FixedTravelTimeEstimator::new(travel),
        &Location::named("Depot"),
        deliveries,
        vehicles,
        ProblemSettings {
            service_minutes: 20,
            lunch: Some(LunchBreak::default()),
            horizon: 1080,
            penalties: &penalties,
        },
    )
    .expect("problem should build");
    match solver.solve(&problem, Duration::from_secs(1)) {
        Ok(SolveOutcome::Solved(solution)) => (problem, solution),
        other => panic!("expected a solution, got {other:?}"),
    }
}

#[rstest]
fn serves_both_orders_in_one_trip(solver: VrpRoutingSolver) {
    let droppable = PenaltyConfig::default().classify(2);
    let deliveries = [
        delivery("A", 50, TimeWindow::new(420, 600), Priority::Mandatory),
        delivery("B", 80, TimeWindow::new(540, 1080), droppable),
    ];
    let (_, solution) = solve(&solver, &deliveries, vec![vehicle("T1", 150, 420)]);

    assert!(solution.dropped.is_empty());
    let route = solution.routes.first().expect("one route");
    assert_eq!(route.total_load(), 130);
    assert!(route.departure >= 420);
    assert!(route.completion <= 1080);
}

#[rstest]
fn capacity_forces_a_drop(solver: VrpRoutingSolver) {
    let droppable = PenaltyConfig::default().classify(2);
    let deliveries = [
        delivery("A", 50, TimeWindow::new(420, 600), Priority::Mandatory),
        delivery("B", 60, TimeWindow::new(540, 1080), droppable),
    ];
    let (_, solution) = solve(&solver, &deliveries, vec![vehicle("T1", 60, 420)]);

    // The mandatory stop outweighs the droppable one.
    assert_eq!(solution.dropped, vec![2]);
    let route = solution.routes.first().expect("one route");
    assert_eq!(route.stops.len(), 1);
    assert_eq!(route.stops.first().map(|stop| stop.node), Some(1));
}

#[rstest]
fn unreachable_window_is_reported_as_dropped(solver: VrpRoutingSolver) {
    let deliveries = [delivery(
        "C",
        10,
        TimeWindow::new(420, 450),
        PenaltyConfig::default().classify(2),
    )];
    let (_, solution) = solve(&solver, &deliveries, vec![vehicle("T1", 100, 420)]);

    assert!(solution.routes.is_empty());
    assert_eq!(solution.dropped, vec![1]);
}

#[rstest]
fn service_never_overlaps_lunch(solver: VrpRoutingSolver) {
    let deliveries = [delivery(
        "L",
        10,
        TimeWindow::new(700, 900),
        Priority::Mandatory,
    )];
    let (problem, solution) = solve(&solver, &deliveries, vec![vehicle("T1", 100, 420)]);

    let stop = solution
        .routes
        .first()
        .and_then(|route| route.stops.first())
        .copied()
        .expect("the stop is served");
    let lunch = problem.lunch().expect("lunch configured");
    assert!(!lunch.overlaps(stop.arrival, stop.departure - stop.arrival));
    assert!(stop.arrival >= 700 && stop.arrival < 900);
}

#[rstest]
fn return_leg_stops_for_lunch(solver: VrpRoutingSolver) {
    let deliveries = [delivery(
        "F",
        10,
        TimeWindow::new(420, 1080),
        Priority::Mandatory,
    )];
    let (problem, solution) =
        solve_with_travel(&solver, 150, &deliveries, vec![vehicle("T1", 100, 420)]);

    let route = solution.routes.first().expect("the stop is served");
    let stop = route.stops.first().copied().expect("one stop");
    assert!(route.completion >= problem.arrival(stop.node, 0, stop.departure));
    assert!(route.completion >= stop.departure + 150);
    assert!(route.completion <= 1080);
    if stop.departure < 780 {
        assert!(route.completion >= stop.departure + 210);
    }
}

#[rstest]
fn routes_reference_offered_vehicles(solver: VrpRoutingSolver) {
    let droppable = PenaltyConfig::default().classify(3);
    let deliveries = [
        delivery("A", 40, TimeWindow::new(420, 1080), droppable),
        delivery("B", 40, TimeWindow::new(420, 1080), droppable),
        delivery("C", 40, TimeWindow::new(420, 1080), droppable),
    ];
    let (_, solution) = solve(
        &solver,
        &deliveries,
        vec![vehicle("T1", 50, 420), vehicle("T2", 50, 480)],
    );

    for route in &solution.routes {
        assert!(route.vehicle < 2);
        assert!(route.total_load() <= 50);
    }
    let served: usize = solution.routes.iter().map(|route| route.stops.len()).sum();
    assert_eq!(served + solution.dropped.len(), 3);
}
