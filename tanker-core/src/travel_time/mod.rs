//! Estimate driving minutes between depot and destinations.
//!
//! The [`TravelTimeEstimator`] trait is the seam the scheduler builds each
//! round's matrix through. [`LayeredEstimator`] is the production
//! implementation: a preloaded [`DistanceMatrix`], an optional live
//! [`MappingProvider`], a haversine approximation and a fixed default, with
//! results memoised in a [`DistanceCache`].
//!
//! Estimation never fails; errors are returned only for invalid input such
//! as an empty location list.

mod cache;
mod error;
mod estimator;
mod haversine;
mod layered;
mod mapping;
mod matrix;

pub use cache::DistanceCache;
pub use error::TravelTimeError;
pub use estimator::{TravelMatrix, TravelTimeEstimator};
pub use haversine::haversine_km;
pub use layered::LayeredEstimator;
pub use mapping::{MappingProvider, NoMappingProvider};
pub use matrix::DistanceMatrix;
