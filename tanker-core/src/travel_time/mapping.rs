//! Live routing-service seam used for per-leg detail.

use geo::Coord;

use super::error::TravelTimeError;

/// Live driving-duration lookup, e.g. a routing web service.
///
/// Calls are best-effort: callers treat every error as "no answer".
pub trait MappingProvider: Send + Sync {
    /// Driving minutes between two coordinates.
    ///
    /// # Errors
    ///
    /// Any transport, status or payload failure.
    fn driving_minutes(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, TravelTimeError>;
}

/// Provider used when no mapping service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMappingProvider;

impl MappingProvider for NoMappingProvider {
    fn driving_minutes(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<f64, TravelTimeError> {
        Err(TravelTimeError::ServiceError {
            code: "Disabled".to_owned(),
            message: "no mapping provider configured".to_owned(),
        })
    }
}

impl<T: MappingProvider + ?Sized> MappingProvider for std::sync::Arc<T> {
    fn driving_minutes(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, TravelTimeError> {
        (**self).driving_minutes(from, to)
    }
}

impl<T: MappingProvider + ?Sized> MappingProvider for Box<T> {
    fn driving_minutes(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, TravelTimeError> {
        (**self).driving_minutes(from, to)
    }
}
