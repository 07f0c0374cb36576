//! Deterministic round problems for the solver benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tanker_core::test_support::{FixedTravelTimeEstimator, delivery};
use tanker_core::{
    Delivery, Location, LunchBreak, PenaltyConfig, ProblemSettings, RoundProblem, RoundVehicle,
    TimeWindow, build_round_problem,
};

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Trucks offered in every benchmark round.
const FLEET_SIZE: usize = 5;

/// Generate a round with `stops` deliveries and randomised legs.
///
/// Travel times fall between 10 and 60 minutes, windows open during the
/// morning and stay open between one and six hours.
#[must_use]
pub fn generate_round(stops: usize, seed: u64) -> Option<RoundProblem> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let penalties = PenaltyConfig::default();

    let deliveries: Vec<Delivery> = (0..stops)
        .map(|index| {
            let start = rng.gen_range(420_u32..720);
            let end = start.saturating_add(rng.gen_range(60_u32..360)).min(1080);
            delivery(
                &format!("S{index}"),
                rng.gen_range(10_u32..60),
                TimeWindow::new(start, end),
                penalties.classify(rng.gen_range(1_u8..4)),
            )
        })
        .collect();

    let mut names = vec!["Depot".to_owned()];
    names.extend(deliveries.iter().map(|d| d.order_id.clone()));
    let mut estimator = FixedTravelTimeEstimator::new(30);
    for from in &names {
        for to in &names {
            estimator = estimator.with_leg(from, to, rng.gen_range(10_u32..60));
        }
    }

    let vehicles = (0..FLEET_SIZE)
        .map(|index| RoundVehicle {
            vehicle_id: format!("T{index}"),
            capacity: 120,
            earliest_start: 420,
        })
        .collect();

    build_round_problem(
        &estimator,
        &Location::named("Depot"),
        &deliveries,
        vehicles,
        ProblemSettings {
            service_minutes: 20,
            lunch: Some(LunchBreak::default()),
            horizon: 1080,
            penalties: &penalties,
        },
    )
    .ok()
}
