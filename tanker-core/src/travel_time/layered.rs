//! Matrix, mapping, haversine and default tiers behind one estimator.

use std::sync::Arc;

use crate::{EstimatorConfig, Location, Minutes};

use super::cache::DistanceCache;
use super::estimator::TravelTimeEstimator;
use super::haversine::haversine_km;
use super::mapping::{MappingProvider, NoMappingProvider};
use super::matrix::DistanceMatrix;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Travel-time estimator with layered fallback and memoisation.
///
/// [`estimate`](TravelTimeEstimator::estimate) consults, in order, the
/// preloaded matrix, the haversine distance between known coordinates and
/// the configured default. [`estimate_detailed`](TravelTimeEstimator::estimate_detailed)
/// additionally asks the live [`MappingProvider`] between the matrix and
/// haversine tiers; it is meant for already finalised routes, not for the
/// per-round matrix. Every estimate between distinct names respects the
/// configured floor.
///
/// Matrix and caches are shared behind [`Arc`] so clones of the estimator
/// reuse them across requests.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use tanker_core::{DistanceMatrix, LayeredEstimator, Location, TravelTimeEstimator};
///
/// let matrix = DistanceMatrix::from_entries([("Depot", "North", 10.0), ("Depot", "South", 45.0)]);
/// let estimator = LayeredEstimator::new(Arc::new(matrix));
///
/// // Below the threshold: ten kilometres at 30 km/h.
/// assert_eq!(estimator.estimate(&Location::named("Depot"), &Location::named("North")), 20);
/// // Above the threshold: minutes as stored.
/// assert_eq!(estimator.estimate(&Location::named("Depot"), &Location::named("South")), 45);
/// // Unknown pair without coordinates: the default.
/// assert_eq!(estimator.estimate(&Location::named("North"), &Location::named("South")), 20);
/// ```
#[derive(Debug, Clone)]
pub struct LayeredEstimator<M = NoMappingProvider> {
    matrix: Arc<DistanceMatrix>,
    mapping: M,
    config: EstimatorConfig,
    cache: Arc<DistanceCache>,
    detailed_cache: Arc<DistanceCache>,
}

impl LayeredEstimator<NoMappingProvider> {
    /// Estimator over `matrix` with default parameters and no live provider.
    #[must_use]
    pub fn new(matrix: Arc<DistanceMatrix>) -> Self {
        Self::with_config(matrix, EstimatorConfig::default())
    }

    /// Estimator over `matrix` with explicit parameters.
    #[must_use]
    pub fn with_config(matrix: Arc<DistanceMatrix>, config: EstimatorConfig) -> Self {
        Self {
            matrix,
            mapping: NoMappingProvider,
            config,
            cache: Arc::new(DistanceCache::new()),
            detailed_cache: Arc::new(DistanceCache::new()),
        }
    }
}

impl<M: MappingProvider> LayeredEstimator<M> {
    /// Replace the live mapping provider used by detailed lookups.
    pub fn with_mapping<N: MappingProvider>(self, mapping: N) -> LayeredEstimator<N> {
        LayeredEstimator {
            matrix: self.matrix,
            mapping,
            config: self.config,
            cache: self.cache,
            detailed_cache: self.detailed_cache,
        }
    }

    /// Reuse an existing cache, e.g. one shared across requests.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DistanceCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Memo used by [`TravelTimeEstimator::estimate`].
    #[must_use]
    pub const fn cache(&self) -> &Arc<DistanceCache> {
        &self.cache
    }

    /// Active parameters.
    #[must_use]
    pub const fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn from_matrix(&self, from: &Location, to: &Location) -> Option<f64> {
        let value = self.matrix.get(&from.name, &to.name)?;
        if !value.is_finite() || value < 0.0 {
            log::debug!(
                "ignoring invalid matrix value {value} for {} -> {}",
                from.name,
                to.name
            );
            return None;
        }
        if value < self.config.km_threshold {
            Some(value / self.config.matrix_speed_kmh * MINUTES_PER_HOUR)
        } else {
            Some(value)
        }
    }

    fn from_haversine(&self, from: &Location, to: &Location) -> Option<f64> {
        let (a, b) = from.coordinate.zip(to.coordinate)?;
        let km = haversine_km(a, b);
        Some(km / self.config.haversine_speed_kmh * MINUTES_PER_HOUR * self.config.congestion_factor)
    }

    fn from_mapping(&self, from: &Location, to: &Location) -> Option<f64> {
        let (a, b) = from.coordinate.zip(to.coordinate)?;
        match self.mapping.driving_minutes(a, b) {
            Ok(minutes) if minutes.is_finite() && minutes >= 0.0 => Some(minutes),
            Ok(minutes) => {
                log::debug!(
                    "mapping provider returned unusable duration {minutes} for {} -> {}",
                    from.name,
                    to.name
                );
                None
            }
            Err(err) => {
                log::debug!(
                    "mapping provider failed for {} -> {}: {err}",
                    from.name,
                    to.name
                );
                None
            }
        }
    }

    fn finish(&self, minutes: Option<f64>, from: &Location, to: &Location) -> Minutes {
        let rounded = minutes.map_or_else(
            || {
                log::debug!(
                    "no travel data for {} -> {}; using default",
                    from.name,
                    to.name
                );
                self.config.default_minutes
            },
            to_minutes,
        );
        rounded.max(self.config.floor_minutes)
    }

    fn memoised(
        &self,
        cache: &DistanceCache,
        from: &Location,
        to: &Location,
        lookup: impl FnOnce() -> Option<f64>,
    ) -> Minutes {
        if from.name == to.name {
            return 0;
        }
        if let Some(hit) = cache.get(&from.name, &to.name) {
            return hit;
        }
        let minutes = self.finish(lookup(), from, to);
        cache.insert(&from.name, &to.name, minutes);
        minutes
    }
}

fn to_minutes(value: f64) -> Minutes {
    let ceiled = value.ceil();
    if ceiled >= f64::from(Minutes::MAX) {
        Minutes::MAX
    } else {
        // Non-negative and below `Minutes::MAX` after the checks above.
        ceiled as Minutes
    }
}

impl<M: MappingProvider> TravelTimeEstimator for LayeredEstimator<M> {
    fn estimate(&self, from: &Location, to: &Location) -> Minutes {
        self.memoised(&self.cache, from, to, || {
            self.from_matrix(from, to)
                .or_else(|| self.from_haversine(from, to))
        })
    }

    fn estimate_detailed(&self, from: &Location, to: &Location) -> Minutes {
        self.memoised(&self.detailed_cache, from, to, || {
            self.from_matrix(from, to)
                .or_else(|| self.from_mapping(from, to))
                .or_else(|| self.from_haversine(from, to))
        })
    }
}
