//! Named places and the lookup table the scheduler resolves them through.

use std::collections::HashMap;

use geo::Coord;
use serde::{Deserialize, Serialize};

/// A named place, optionally geolocated.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique name used as the travel-time key.
    pub name: String,
    /// Position, when known.
    #[serde(default)]
    pub coordinate: Option<Coord<f64>>,
}

impl Location {
    /// A location known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinate: None,
        }
    }

    /// A location with a coordinate.
    pub fn at(name: impl Into<String>, coordinate: Coord<f64>) -> Self {
        Self {
            name: name.into(),
            coordinate: Some(coordinate),
        }
    }
}

/// Name-indexed set of known locations.
///
/// Destinations that were never declared resolve to coordinate-less
/// locations so estimation falls back to the matrix or the default.
#[derive(Debug, Clone, Default)]
pub struct LocationBook {
    by_name: HashMap<String, Location>,
}

impl LocationBook {
    /// Index `locations` by name. Later duplicates replace earlier ones.
    pub fn new<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = Location>,
    {
        Self {
            by_name: locations
                .into_iter()
                .map(|location| (location.name.clone(), location))
                .collect(),
        }
    }

    /// Look up `name`, falling back to a coordinate-less location.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Location {
        self.by_name
            .get(name)
            .cloned()
            .unwrap_or_else(|| Location::named(name))
    }

    /// Number of declared locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no location has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
