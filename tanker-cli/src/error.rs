//! Error types emitted by the tanker CLI.

use std::sync::Arc;

use camino::Utf8PathBuf;
use tanker_core::{DispatchError, Minutes};
use tanker_data::MatrixLoadError;
use tanker_data::routing::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the tanker CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        feature: &'static str,
        action: &'static str,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading a JSON input failed.
    #[error("failed to read {field} at {path:?}: {source}")]
    ReadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A JSON input could not be decoded.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The workday overrides describe an empty day.
    #[error("day closes at minute {day_close}, before it starts at minute {day_start}")]
    InvalidWorkday {
        day_start: Minutes,
        day_close: Minutes,
    },
    /// Loading the distance file failed.
    #[error(transparent)]
    LoadMatrix(#[from] MatrixLoadError),
    /// Constructing the mapping provider failed.
    #[error("failed to build mapping provider for {base_url:?}: {source}")]
    BuildMappingProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The scheduler hit a broken solver or problem contract.
    #[error("dispatch failed: {source}")]
    Dispatch {
        #[source]
        source: DispatchError,
    },
    /// Serialising the output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing the output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
