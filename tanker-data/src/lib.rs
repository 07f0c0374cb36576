//! Data access for the tanker dispatcher.
//!
//! Responsibilities:
//! - Load the static distance dataset from JSON files.
//! - Provide the live mapping adapter (OSRM over HTTP).
//!
//! Boundaries:
//! - Do not encode dispatch rules (those live in `tanker-core`).
//! - Keep blocking I/O off async executors.

pub mod matrix_file;
pub mod routing;

pub use matrix_file::{MatrixEntry, MatrixLoadError, load_distance_matrix, parse_distance_matrix};
