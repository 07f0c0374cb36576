//! Travel-time estimator trait and the matrix alias it produces.

use crate::{Location, Minutes};

use super::error::TravelTimeError;

/// Square matrix of travel minutes; `matrix[i][j]` is the time from the
/// `i`-th to the `j`-th location.
pub type TravelMatrix = Vec<Vec<Minutes>>;

/// Estimate driving minutes between named locations.
///
/// `estimate` never fails: implementations degrade to coarser sources rather
/// than returning an error, so a round can always be built. Identical names
/// are zero minutes apart.
///
/// # Examples
///
/// ```rust
/// use tanker_core::{Location, Minutes, TravelTimeEstimator};
///
/// struct Flat;
///
/// impl TravelTimeEstimator for Flat {
///     fn estimate(&self, from: &Location, to: &Location) -> Minutes {
///         if from.name == to.name { 0 } else { 15 }
///     }
/// }
///
/// let stops = [Location::named("Depot"), Location::named("North")];
/// let matrix = Flat.travel_matrix(&stops)?;
/// assert_eq!(matrix, vec![vec![0, 15], vec![15, 0]]);
/// # Ok::<(), tanker_core::TravelTimeError>(())
/// ```
pub trait TravelTimeEstimator: Send + Sync {
    /// Minutes to drive from `from` to `to`.
    fn estimate(&self, from: &Location, to: &Location) -> Minutes;

    /// Slower, more precise lookup for legs of already finalised routes.
    ///
    /// Defaults to [`estimate`](Self::estimate).
    fn estimate_detailed(&self, from: &Location, to: &Location) -> Minutes {
        self.estimate(from, to)
    }

    /// Build the full matrix for `locations`.
    ///
    /// # Errors
    ///
    /// Returns [`TravelTimeError::EmptyInput`] when `locations` is empty.
    fn travel_matrix(&self, locations: &[Location]) -> Result<TravelMatrix, TravelTimeError> {
        if locations.is_empty() {
            return Err(TravelTimeError::EmptyInput);
        }
        Ok(locations
            .iter()
            .map(|from| {
                locations
                    .iter()
                    .map(|to| {
                        if from.name == to.name {
                            0
                        } else {
                            self.estimate(from, to)
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

impl<T: TravelTimeEstimator + ?Sized> TravelTimeEstimator for &T {
    fn estimate(&self, from: &Location, to: &Location) -> Minutes {
        (**self).estimate(from, to)
    }

    fn estimate_detailed(&self, from: &Location, to: &Location) -> Minutes {
        (**self).estimate_detailed(from, to)
    }
}
