//! Load a [`DistanceMatrix`] from a JSON file.
//!
//! The file holds an array of directional entries:
//!
//! ```json
//! [
//!   { "from": "Depot", "to": "North", "value": 12.5 },
//!   { "from": "North", "to": "Depot", "value": 35 }
//! ]
//! ```
//!
//! Whether a value is kilometres or minutes is decided later by the
//! estimator's threshold.

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use tanker_core::DistanceMatrix;
use thiserror::Error;

/// One directional entry of the distance file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatrixEntry {
    /// Origin name.
    pub from: String,
    /// Destination name.
    pub to: String,
    /// Kilometres or minutes.
    pub value: f64,
}

/// Errors returned when loading a distance file.
#[derive(Debug, Error)]
pub enum MatrixLoadError {
    /// The file could not be opened or read.
    #[error("failed to read distance matrix at {path}")]
    Open {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not a valid entry list.
    #[error("failed to parse distance matrix: {source}")]
    Parse {
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
    /// An entry carries a negative or non-finite value.
    #[error("invalid distance {value} for {from} -> {to}")]
    InvalidValue {
        /// Origin name.
        from: String,
        /// Destination name.
        to: String,
        /// Rejected value.
        value: f64,
    },
}

/// Parse a distance file already read into memory.
///
/// # Errors
///
/// Returns [`MatrixLoadError::Parse`] for malformed JSON and
/// [`MatrixLoadError::InvalidValue`] for negative or non-finite values.
pub fn parse_distance_matrix(text: &str) -> Result<DistanceMatrix, MatrixLoadError> {
    let entries: Vec<MatrixEntry> =
        serde_json::from_str(text).map_err(|source| MatrixLoadError::Parse { source })?;
    if let Some(bad) = entries
        .iter()
        .find(|entry| !entry.value.is_finite() || entry.value < 0.0)
    {
        return Err(MatrixLoadError::InvalidValue {
            from: bad.from.clone(),
            to: bad.to.clone(),
            value: bad.value,
        });
    }
    let matrix = DistanceMatrix::from_entries(
        entries
            .into_iter()
            .map(|entry| (entry.from, entry.to, entry.value)),
    );
    log::debug!("loaded distance matrix with {} pairs", matrix.len());
    Ok(matrix)
}

/// Read and parse the distance file at `path`.
///
/// # Examples
/// ```no_run
/// use camino::Utf8Path;
/// use tanker_data::load_distance_matrix;
///
/// let matrix = load_distance_matrix(Utf8Path::new("distances.json"))?;
/// println!("{} pairs", matrix.len());
/// # Ok::<(), tanker_data::MatrixLoadError>(())
/// ```
///
/// # Errors
///
/// Returns [`MatrixLoadError::Open`] when the file cannot be read, plus the
/// errors of [`parse_distance_matrix`].
pub fn load_distance_matrix(path: &Utf8Path) -> Result<DistanceMatrix, MatrixLoadError> {
    let text = tanker_fs::read_utf8_to_string(path).map_err(|source| MatrixLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_distance_matrix(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_directional_entries() {
        let matrix = parse_distance_matrix(
            r#"[
                {"from": "Depot", "to": "North", "value": 12.5},
                {"from": "North", "to": "Depot", "value": 35}
            ]"#,
        )
        .expect("valid file");
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.get("Depot", "North"), Some(12.5));
        assert_eq!(matrix.get("North", "Depot"), Some(35.0));
    }

    #[rstest]
    fn empty_list_is_an_empty_matrix() {
        let matrix = parse_distance_matrix("[]").expect("valid file");
        assert!(matrix.is_empty());
    }

    #[rstest]
    fn rejects_negative_values() {
        let err = parse_distance_matrix(r#"[{"from": "A", "to": "B", "value": -1}]"#)
            .expect_err("negative distance");
        assert!(matches!(err, MatrixLoadError::InvalidValue { ref from, .. } if from == "A"));
    }

    #[rstest]
    #[case("{}")]
    #[case(r#"[{"from": "A", "value": 3}]"#)]
    #[case("not json")]
    fn rejects_malformed_files(#[case] text: &str) {
        let err = parse_distance_matrix(text).expect_err("malformed file");
        assert!(matches!(err, MatrixLoadError::Parse { .. }));
    }
}
