//! Static distance dataset keyed by location-name pairs.

use std::collections::HashMap;

/// Immutable snapshot of a preloaded distance matrix.
///
/// Values are stored as read; whether a value is kilometres or minutes is
/// decided by the estimator's threshold. Entries are directional.
///
/// # Examples
/// ```
/// use tanker_core::DistanceMatrix;
///
/// let matrix = DistanceMatrix::from_entries([("Depot", "North", 12.5)]);
/// assert_eq!(matrix.get("Depot", "North"), Some(12.5));
/// assert_eq!(matrix.get("North", "Depot"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    entries: HashMap<(String, String), f64>,
}

impl DistanceMatrix {
    /// Build a matrix from `(from, to, value)` triples. Later duplicates win.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, f64)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(from, to, value)| ((from.into(), to.into()), value))
                .collect(),
        }
    }

    /// Raw value for the ordered pair, if present.
    #[must_use]
    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        self.entries
            .get(&(from.to_owned(), to.to_owned()))
            .copied()
    }

    /// Number of stored pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the matrix holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
