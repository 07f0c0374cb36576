//! Live driving durations from an OSRM routing service.
//!
//! [`OsrmMappingProvider`] implements [`tanker_core::MappingProvider`] on top
//! of the OSRM Route API. The core trait is synchronous so the scheduler can
//! stay embeddable; the provider blocks on its HTTP calls internally.
//!
//! Only the detailed leg pass asks the mapping tier for a duration. Every
//! failure is reported as a [`tanker_core::TravelTimeError`] and the
//! estimator falls through to the haversine tier.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use tanker_core::MappingProvider;
//! use tanker_data::routing::{OsrmMappingProvider, OsrmMappingProviderConfig};
//!
//! let config = OsrmMappingProviderConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(3));
//! let provider = OsrmMappingProvider::with_config(config)?;
//!
//! let minutes = provider.driving_minutes(
//!     Coord { x: -0.1, y: 51.5 },
//!     Coord { x: -0.2, y: 51.6 },
//! )?;
//! println!("{minutes:.1} minutes");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_USER_AGENT, OsrmMappingProvider, OsrmMappingProviderConfig, ProviderBuildError,
};
