//! Dispatch tuning knobs.
//!
//! Every struct deserialises with defaults for missing fields so a request or
//! configuration file only names what it overrides.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Minutes, PreferenceRule, Priority, ProductCatalog, ProductFamily};

/// Fixed daily unavailability window applied to every vehicle.
///
/// # Examples
/// ```
/// use tanker_core::LunchBreak;
///
/// let lunch = LunchBreak { start: 720, duration: 60 };
/// assert_eq!(lunch.push_out(700), 700);
/// assert_eq!(lunch.push_out(745), 780);
/// assert_eq!(lunch.push_out(780), 780);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LunchBreak {
    /// Minute the break begins.
    pub start: Minutes,
    /// Length of the break in minutes.
    pub duration: Minutes,
}

impl Default for LunchBreak {
    fn default() -> Self {
        Self {
            start: 720,
            duration: 60,
        }
    }
}

impl LunchBreak {
    /// Minute the break ends (exclusive).
    #[must_use]
    pub const fn end(&self) -> Minutes {
        self.start.saturating_add(self.duration)
    }

    /// Whether `minute` falls inside `[start, end)`.
    #[must_use]
    pub const fn contains(&self, minute: Minutes) -> bool {
        self.start <= minute && minute < self.end()
    }

    /// Move a time inside the break to exactly its end.
    #[must_use]
    pub const fn push_out(&self, minute: Minutes) -> Minutes {
        if self.contains(minute) {
            self.end()
        } else {
            minute
        }
    }

    /// Whether a service running `[begin, begin + length)` overlaps the
    /// break.
    #[must_use]
    pub const fn overlaps(&self, begin: Minutes, length: Minutes) -> bool {
        begin < self.end() && self.start < begin.saturating_add(length)
    }

    /// Driving minutes for a leg of `travel` minutes leaving at `departure`.
    ///
    /// A leg that would be on the road during the break stops for its whole
    /// length.
    #[must_use]
    pub const fn drive(&self, departure: Minutes, travel: Minutes) -> Minutes {
        if travel > 0 && self.overlaps(departure, travel) {
            travel.saturating_add(self.duration)
        } else {
            travel
        }
    }
}

/// Working-day shape and loop bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkdayConfig {
    /// Minute vehicles first become available.
    pub day_start: Minutes,
    /// Minute by which vehicles must be back at the depot.
    pub day_close: Minutes,
    /// No round starts within this many minutes of `day_close`.
    pub safety_margin: Minutes,
    /// Daily lunch break, if any.
    pub lunch: Option<LunchBreak>,
    /// Minutes to refill at the depot between trips.
    pub reload_minutes: Minutes,
    /// Upper bound on rounds per scheduling pass.
    pub max_rounds: u32,
    /// Wall-clock budget for each solver call, in seconds.
    pub round_time_limit_secs: u64,
    /// Unloading minutes for families without an explicit entry.
    pub default_service_minutes: Minutes,
    /// Unloading minutes per family.
    pub service_minutes: BTreeMap<ProductFamily, Minutes>,
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            day_start: 420,
            day_close: 1080,
            safety_margin: 60,
            lunch: Some(LunchBreak::default()),
            reload_minutes: 30,
            max_rounds: 5,
            round_time_limit_secs: 2,
            default_service_minutes: 20,
            service_minutes: BTreeMap::new(),
        }
    }
}

impl WorkdayConfig {
    /// Latest `next_available` at which a vehicle may still start a round
    /// (exclusive).
    #[must_use]
    pub const fn round_cutoff(&self) -> Minutes {
        self.day_close.saturating_sub(self.safety_margin)
    }

    /// Solver budget per round.
    #[must_use]
    pub const fn round_time_limit(&self) -> Duration {
        Duration::from_secs(self.round_time_limit_secs)
    }

    /// Unloading minutes for `family`.
    #[must_use]
    pub fn service_for(&self, family: &ProductFamily) -> Minutes {
        self.service_minutes
            .get(family)
            .copied()
            .unwrap_or(self.default_service_minutes)
    }
}

/// Parameters of the layered travel-time estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Matrix values below this are kilometres; others are minutes.
    pub km_threshold: f64,
    /// Speed used to turn matrix kilometres into minutes.
    pub matrix_speed_kmh: f64,
    /// Speed used for straight-line distances.
    pub haversine_speed_kmh: f64,
    /// Multiplier applied to straight-line travel times.
    pub congestion_factor: f64,
    /// Estimate used when nothing else is known.
    pub default_minutes: Minutes,
    /// Lower bound for any estimate between distinct locations.
    pub floor_minutes: Minutes,
    /// Per-call timeout for the live mapping provider, in seconds.
    pub mapping_timeout_secs: u64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            km_threshold: 20.0,
            matrix_speed_kmh: 30.0,
            haversine_speed_kmh: 30.0,
            congestion_factor: 1.3,
            default_minutes: 20,
            floor_minutes: 5,
            mapping_timeout_secs: 3,
        }
    }
}

/// Penalty weights handed to the solver for each priority level.
///
/// A level-`n` droppable delivery costs `droppable_base / (n - 1)`, so level
/// 2 is the most expensive to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyConfig {
    /// Penalty standing in for "must visit" when the solver only supports
    /// soft constraints.
    pub mandatory: u64,
    /// Penalty for dropping a level-2 delivery.
    pub droppable_base: u64,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            mandatory: 10_000_000,
            droppable_base: 100_000,
        }
    }
}

impl PenaltyConfig {
    /// Classify a request level. Levels `0` and `1` are mandatory.
    ///
    /// # Examples
    /// ```
    /// use tanker_core::{PenaltyConfig, Priority};
    ///
    /// let penalties = PenaltyConfig::default();
    /// assert_eq!(penalties.classify(1), Priority::Mandatory);
    /// assert_eq!(
    ///     penalties.classify(3),
    ///     Priority::Droppable { level: 3, penalty_weight: 50_000 },
    /// );
    /// ```
    #[must_use]
    pub fn classify(&self, level: u8) -> Priority {
        if level <= 1 {
            return Priority::Mandatory;
        }
        let divisor = u64::from(level - 1);
        Priority::Droppable {
            level,
            penalty_weight: (self.droppable_base / divisor).max(1),
        }
    }

    /// Penalty the solver pays for leaving a node with `priority` unvisited.
    #[must_use]
    pub const fn weight_of(&self, priority: &Priority) -> u64 {
        match priority {
            Priority::Mandatory => self.mandatory,
            Priority::Droppable { penalty_weight, .. } => *penalty_weight,
        }
    }
}

/// What a round does when the solver returns nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoProgressPolicy {
    /// Stop the pass and report every pending delivery.
    #[default]
    Terminate,
    /// Retry once with the deliveries still reachable in time, then stop.
    RetryReachable,
}

/// Complete scheduler configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Working-day shape.
    pub workday: WorkdayConfig,
    /// Travel-time estimator parameters.
    pub estimator: EstimatorConfig,
    /// Product-to-family mapping.
    pub catalog: ProductCatalog,
    /// Vehicle preference passes, run before the general pass.
    pub preferences: Vec<PreferenceRule>,
    /// Behaviour on rounds that assign nothing.
    pub no_progress: NoProgressPolicy,
    /// Drop penalties.
    pub penalties: PenaltyConfig,
    /// Annotate finished routes with per-leg travel times.
    pub detail_legs: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(719, 719)]
    #[case(720, 780)]
    #[case(779, 780)]
    #[case(780, 780)]
    fn lunch_push_out_lands_on_end(#[case] minute: Minutes, #[case] expected: Minutes) {
        assert_eq!(LunchBreak::default().push_out(minute), expected);
    }

    #[rstest]
    #[case(690, 30, false)]
    #[case(700, 30, true)]
    #[case(779, 5, true)]
    #[case(780, 20, false)]
    fn lunch_overlap(#[case] begin: Minutes, #[case] length: Minutes, #[case] overlaps: bool) {
        assert_eq!(LunchBreak::default().overlaps(begin, length), overlaps);
    }

    #[rstest]
    #[case(600, 100, 100)]
    #[case(690, 30, 30)]
    #[case(700, 30, 90)]
    #[case(720, 30, 90)]
    #[case(590, 150, 210)]
    #[case(780, 30, 30)]
    #[case(730, 0, 0)]
    fn legs_on_the_road_during_lunch_stop_for_it(
        #[case] departure: Minutes,
        #[case] travel: Minutes,
        #[case] expected: Minutes,
    ) {
        assert_eq!(LunchBreak::default().drive(departure, travel), expected);
    }

    #[rstest]
    #[case(2, 100_000)]
    #[case(3, 50_000)]
    #[case(5, 25_000)]
    fn penalty_shrinks_with_level(#[case] level: u8, #[case] weight: u64) {
        let priority = PenaltyConfig::default().classify(level);
        assert_eq!(PenaltyConfig::default().weight_of(&priority), weight);
    }

    #[rstest]
    fn partial_config_keeps_defaults() {
        let config: DispatchConfig = serde_json::from_str(
            r#"{"workday": {"reload_minutes": 45}, "no_progress": "retry_reachable"}"#,
        )
        .expect("config should parse");
        assert_eq!(config.workday.reload_minutes, 45);
        assert_eq!(config.workday.day_start, 420);
        assert_eq!(config.no_progress, NoProgressPolicy::RetryReachable);
        assert_eq!(config.estimator.floor_minutes, 5);
    }

    #[rstest]
    fn service_minutes_fall_back_to_default() {
        let mut workday = WorkdayConfig::default();
        workday
            .service_minutes
            .insert(ProductFamily::new("heavy"), 35);
        assert_eq!(workday.service_for(&ProductFamily::new("heavy")), 35);
        assert_eq!(workday.service_for(&ProductFamily::new("light")), 20);
    }
}
