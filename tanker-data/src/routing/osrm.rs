//! Response types for the OSRM Route service.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
///
/// `routes` is present on success; `message` explains a failure.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code, e.g. `"Ok"`, `"NoRoute"` or `"InvalidQuery"`.
    pub code: String,
    /// Error detail when `code` is not `"Ok"`.
    pub message: Option<String>,
    /// Alternative routes, fastest first.
    pub routes: Option<Vec<RouteSummary>>,
}

impl RouteResponse {
    /// Whether OSRM reported success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// Totals of one route. Geometry and legs are not requested.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RouteSummary {
    /// Seconds.
    pub duration: f64,
    /// Metres.
    pub distance: f64,
}
