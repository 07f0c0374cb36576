//! Tanker trucks and the product families they carry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Product family a tanker compartment is certified for, e.g. `light` or
/// `heavy`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductFamily(String);

impl ProductFamily {
    /// Wrap a family name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Family name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductFamily {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A delivery truck carrying a single product family.
///
/// # Examples
/// ```
/// use tanker_core::Vehicle;
///
/// let truck = Vehicle::new("T1", "light", 100);
/// assert_eq!(truck.family.as_str(), "light");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Fleet identifier.
    pub id: String,
    /// Family the vehicle is loaded with for the whole day.
    pub family: ProductFamily,
    /// Tank capacity in the same unit as order quantities.
    pub capacity: u32,
}

impl Vehicle {
    /// Construct a vehicle.
    pub fn new(id: impl Into<String>, family: impl Into<ProductFamily>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            family: family.into(),
            capacity,
        }
    }
}
