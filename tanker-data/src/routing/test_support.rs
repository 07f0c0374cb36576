//! Deterministic [`MappingProvider`] double for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use geo::Coord;
use tanker_core::{MappingProvider, TravelTimeError};

/// Stub `MappingProvider` returning a fixed answer without any HTTP.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use tanker_core::MappingProvider;
/// use tanker_data::routing::test_support::StubMappingProvider;
///
/// let provider = StubMappingProvider::with_minutes(12.5);
/// let minutes = provider
///     .driving_minutes(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 })
///     .expect("stub answers");
/// assert!((minutes - 12.5).abs() < f64::EPSILON);
/// assert_eq!(provider.calls(), 1);
/// ```
#[derive(Debug)]
pub struct StubMappingProvider {
    response: StubResponse,
    calls: AtomicUsize,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Minutes(f64),
    Error(TravelTimeError),
}

impl StubMappingProvider {
    /// Provider answering every lookup with `minutes`.
    #[must_use]
    pub const fn with_minutes(minutes: f64) -> Self {
        Self {
            response: StubResponse::Minutes(minutes),
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider failing every lookup with `error`.
    #[must_use]
    pub const fn with_error(error: TravelTimeError) -> Self {
        Self {
            response: StubResponse::Error(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of lookups made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MappingProvider for StubMappingProvider {
    fn driving_minutes(&self, _from: Coord<f64>, _to: Coord<f64>) -> Result<f64, TravelTimeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            StubResponse::Minutes(minutes) => Ok(*minutes),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}
