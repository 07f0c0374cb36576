//! Memoised pairwise estimates.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::Minutes;

/// Append-only memo of estimated minutes per ordered name pair.
///
/// Entries live for the process lifetime and are never invalidated. Reads
/// take the read lock and inserts the write lock; racing inserts of the same
/// pair write identical values.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: RwLock<HashMap<(String, String), Minutes>>,
}

impl DistanceCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached minutes for the ordered pair.
    #[must_use]
    pub fn get(&self, from: &str, to: &str) -> Option<Minutes> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(from.to_owned(), to.to_owned()))
            .copied()
    }

    /// Record minutes for the ordered pair.
    pub fn insert(&self, from: &str, to: &str, minutes: Minutes) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((from.to_owned(), to.to_owned()), minutes);
    }

    /// Number of memoised pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been memoised yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
