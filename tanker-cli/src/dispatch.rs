//! Dispatch command implementation for the tanker CLI.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tanker_core::{
    DispatchConfig, DispatchRequest, DispatchResult, DistanceMatrix, LayeredEstimator,
    MappingProvider, Minutes, NoMappingProvider, RoutingSolver, Scheduler,
};
use tanker_data::load_distance_matrix;
use tanker_data::routing::{OsrmMappingProvider, OsrmMappingProviderConfig};

use crate::{
    ARG_DISPATCH_CONFIG, ARG_DISPATCH_MATRIX, ARG_DISPATCH_OSRM_BASE_URL, ARG_DISPATCH_OUTPUT,
    ARG_DISPATCH_REQUEST, CliError, ENV_DISPATCH_REQUEST,
};

/// CLI arguments for the `dispatch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Schedule a day of fuel deliveries. The request is a \
                 JSON-encoded DispatchRequest (depot, locations, orders, \
                 vehicles). Scheduler settings come from an optional JSON \
                 DispatchConfig file, adjusted by the workday flags below.",
    about = "Schedule a day's orders across the fleet"
)]
#[ortho_config(prefix = "TANKER")]
pub(crate) struct DispatchArgs {
    /// Path to a JSON file containing a DispatchRequest.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Path to a JSON DispatchConfig with scheduler settings.
    #[arg(long = ARG_DISPATCH_CONFIG, value_name = "path")]
    #[serde(default)]
    pub(crate) dispatch_config: Option<Utf8PathBuf>,
    /// Path to a JSON distance file (`[{"from", "to", "value"}]`).
    #[arg(long = ARG_DISPATCH_MATRIX, value_name = "path")]
    #[serde(default)]
    pub(crate) matrix: Option<Utf8PathBuf>,
    /// OSRM base URL; enables per-leg travel detail on finished routes.
    #[arg(long = ARG_DISPATCH_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Write the result here instead of stdout.
    #[arg(long = ARG_DISPATCH_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// First departure of the day, in minutes after midnight.
    #[arg(long, value_name = "minute")]
    #[serde(default)]
    pub(crate) day_start: Option<Minutes>,
    /// Latest return to the depot, in minutes after midnight.
    #[arg(long, value_name = "minute")]
    #[serde(default)]
    pub(crate) day_close: Option<Minutes>,
    /// Maximum rounds per family pass.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) max_rounds: Option<u32>,
    /// Solver wall-clock budget per round, in seconds.
    #[arg(long, value_name = "secs")]
    #[serde(default)]
    pub(crate) round_time_limit_secs: Option<u64>,
}

impl DispatchArgs {
    pub(crate) fn into_config(self) -> Result<DispatchCommandConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        DispatchCommandConfig::try_from(merged)
    }
}

/// Workday values given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorkdayOverrides {
    pub(crate) day_start: Option<Minutes>,
    pub(crate) day_close: Option<Minutes>,
    pub(crate) max_rounds: Option<u32>,
    pub(crate) round_time_limit_secs: Option<u64>,
}

impl WorkdayOverrides {
    /// Apply the overrides to `config`, rejecting an empty day.
    pub(crate) fn apply(self, config: &mut DispatchConfig) -> Result<(), CliError> {
        let workday = &mut config.workday;
        if let Some(day_start) = self.day_start {
            workday.day_start = day_start;
        }
        if let Some(day_close) = self.day_close {
            workday.day_close = day_close;
        }
        if let Some(max_rounds) = self.max_rounds {
            workday.max_rounds = max_rounds;
        }
        if let Some(secs) = self.round_time_limit_secs {
            workday.round_time_limit_secs = secs;
        }
        if workday.day_close <= workday.day_start {
            return Err(CliError::InvalidWorkday {
                day_start: workday.day_start,
                day_close: workday.day_close,
            });
        }
        Ok(())
    }
}

/// Resolved `dispatch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DispatchCommandConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) dispatch_config: Option<Utf8PathBuf>,
    pub(crate) matrix: Option<Utf8PathBuf>,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) output: Option<Utf8PathBuf>,
    pub(crate) overrides: WorkdayOverrides,
}

impl DispatchCommandConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.request_path, ARG_DISPATCH_REQUEST)?;
        if let Some(path) = &self.dispatch_config {
            require_existing(path, ARG_DISPATCH_CONFIG)?;
        }
        if let Some(path) = &self.matrix {
            require_existing(path, ARG_DISPATCH_MATRIX)?;
        }
        Ok(())
    }
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match tanker_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) if path.is_dir() => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Ok(false) => Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TryFrom<DispatchArgs> for DispatchCommandConfig {
    type Error = CliError;

    fn try_from(args: DispatchArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_DISPATCH_REQUEST,
            env: ENV_DISPATCH_REQUEST,
        })?;
        Ok(Self {
            request_path,
            dispatch_config: args.dispatch_config,
            matrix: args.matrix,
            osrm_base_url: args.osrm_base_url,
            output: args.output,
            overrides: WorkdayOverrides {
                day_start: args.day_start,
                day_close: args.day_close,
                max_rounds: args.max_rounds,
                round_time_limit_secs: args.round_time_limit_secs,
            },
        })
    }
}

/// Builds the solver and mapping backends for a dispatch invocation.
pub(crate) trait DispatchBackendBuilder {
    fn solver(&self) -> Result<Box<dyn RoutingSolver>, CliError>;

    fn mapping(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Box<dyn MappingProvider>, CliError>;
}

pub(crate) struct DefaultDispatchBackendBuilder;

impl DispatchBackendBuilder for DefaultDispatchBackendBuilder {
    #[cfg(feature = "solver-vrp")]
    fn solver(&self) -> Result<Box<dyn RoutingSolver>, CliError> {
        Ok(Box::new(tanker_solver_vrp::VrpRoutingSolver::new()))
    }

    #[cfg(not(feature = "solver-vrp"))]
    fn solver(&self) -> Result<Box<dyn RoutingSolver>, CliError> {
        Err(CliError::MissingFeature {
            feature: "solver-vrp",
            action: "dispatch",
        })
    }

    fn mapping(
        &self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Box<dyn MappingProvider>, CliError> {
        let config = OsrmMappingProviderConfig::new(base_url).with_timeout(timeout);
        let provider = OsrmMappingProvider::with_config(config).map_err(|source| {
            CliError::BuildMappingProvider {
                base_url: base_url.to_owned(),
                source,
            }
        })?;
        Ok(Box::new(provider))
    }
}

pub(crate) fn run_dispatch(args: DispatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_dispatch_with(args, &DefaultDispatchBackendBuilder, &mut stdout)
}

pub(crate) fn run_dispatch_with(
    args: DispatchArgs,
    builder: &dyn DispatchBackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_dispatch_config(args)?;
    let result = execute_dispatch(&config, builder)?;
    let payload = serde_json::to_string_pretty(&result).map_err(CliError::SerialiseOutput)?;
    match &config.output {
        Some(path) => tanker_fs::write_utf8_file(path, &format!("{payload}\n"))
            .map_err(CliError::WriteOutput),
        None => writer
            .write_all(payload.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(CliError::WriteOutput),
    }
}

fn resolve_dispatch_config(args: DispatchArgs) -> Result<DispatchCommandConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

pub(crate) fn execute_dispatch(
    config: &DispatchCommandConfig,
    builder: &dyn DispatchBackendBuilder,
) -> Result<DispatchResult, CliError> {
    let request: DispatchRequest = load_json(&config.request_path, ARG_DISPATCH_REQUEST)?;
    let settings = resolve_settings(config)?;

    let matrix = match &config.matrix {
        Some(path) => load_distance_matrix(path)?,
        None => DistanceMatrix::default(),
    };
    let mapping: Box<dyn MappingProvider> = match &config.osrm_base_url {
        Some(base_url) => builder.mapping(
            base_url,
            Duration::from_secs(settings.estimator.mapping_timeout_secs),
        )?,
        None => Box::new(NoMappingProvider),
    };
    let estimator = LayeredEstimator::with_config(Arc::new(matrix), settings.estimator.clone())
        .with_mapping(mapping);
    let solver = builder.solver()?;

    log::info!(
        "dispatching {} orders with {} vehicles",
        request.orders.len(),
        request.vehicles.len()
    );
    Scheduler::with_config(estimator, solver, settings)
        .dispatch(&request)
        .map_err(|source| CliError::Dispatch { source })
}

/// Scheduler settings: the config file or defaults, then CLI overrides.
pub(crate) fn resolve_settings(config: &DispatchCommandConfig) -> Result<DispatchConfig, CliError> {
    let mut settings = match &config.dispatch_config {
        Some(path) => load_json(path, ARG_DISPATCH_CONFIG)?,
        None => DispatchConfig::default(),
    };
    config.overrides.apply(&mut settings)?;
    if config.osrm_base_url.is_some() {
        settings.detail_legs = true;
    }
    Ok(settings)
}

/// Decode a JSON input file.
pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let text = tanker_fs::read_utf8_to_string(path).map_err(|source| CliError::ReadInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}
