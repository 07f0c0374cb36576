//! `MappingProvider` backed by OSRM's Route API.
//!
//! The [`MappingProvider`] trait is synchronous. This provider bridges its
//! async HTTP calls to that interface by blocking on a Tokio runtime it owns,
//! or on the caller's multi-threaded runtime when there is one.

use std::time::Duration;

use geo::Coord;
use reqwest::Client;
use tanker_core::{MappingProvider, TravelTimeError};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::RouteResponse;

/// Errors raised while constructing an [`OsrmMappingProvider`].
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The Tokio runtime could not be built.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "tanker-routing/0.1";

/// Per-call timeout; detailed lookups are best-effort.
const DEFAULT_TIMEOUT_SECS: u64 = 3;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// Configuration for [`OsrmMappingProvider`].
#[derive(Debug, Clone)]
pub struct OsrmMappingProviderConfig {
    /// Base URL of the OSRM service, e.g. `"http://localhost:5000"`.
    pub base_url: String,
    /// Connect and request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for OsrmMappingProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmMappingProviderConfig {
    /// Configuration for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the per-call timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Driving durations from OSRM's Route API.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the provider blocks on its own runtime. Inside a
/// multi-threaded runtime it uses the caller's handle with
/// [`tokio::task::block_in_place`]. Inside a `current_thread` runtime it falls
/// back to its own runtime, which may stall the caller if the request depends
/// on IO that runtime drives.
pub struct OsrmMappingProvider {
    client: Client,
    config: OsrmMappingProviderConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmMappingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmMappingProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmMappingProvider {
    /// Provider for the service at `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmMappingProviderConfig::new(base_url))
    }

    /// Provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmMappingProviderConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmMappingProviderConfig {
        &self.config
    }

    /// `{base_url}/route/v1/driving/{lon},{lat};{lon},{lat}?overview=false`
    fn build_route_url(&self, from: Coord<f64>, to: Coord<f64>) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.config.base_url.trim_end_matches('/'),
            from.x,
            from.y,
            to.x,
            to.y
        )
    }

    async fn fetch_minutes_async(
        &self,
        from: Coord<f64>,
        to: Coord<f64>,
    ) -> Result<f64, TravelTimeError> {
        let url = self.build_route_url(from, to);
        log::trace!("requesting {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| TravelTimeError::ParseError {
                    message: err.to_string(),
                })?;

        convert_response(route_response)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> TravelTimeError {
        if error.is_timeout() {
            return TravelTimeError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return TravelTimeError::HttpError {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        TravelTimeError::NetworkError {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Minutes of the fastest route in an OSRM answer.
fn convert_response(response: RouteResponse) -> Result<f64, TravelTimeError> {
    if !response.is_ok() {
        return Err(TravelTimeError::ServiceError {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let route = response
        .routes
        .and_then(|routes| routes.first().copied())
        .ok_or_else(|| TravelTimeError::ParseError {
            message: "OSRM response contains no routes".to_owned(),
        })?;
    log::trace!("OSRM route: {:.0} m in {:.0} s", route.distance, route.duration);

    let seconds = route.duration;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TravelTimeError::ParseError {
            message: format!("OSRM returned invalid duration {seconds}"),
        });
    }
    Ok(seconds / SECONDS_PER_MINUTE)
}

impl MappingProvider for OsrmMappingProvider {
    fn driving_minutes(&self, from: Coord<f64>, to: Coord<f64>) -> Result<f64, TravelTimeError> {
        let future = self.fetch_minutes_async(from, to);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}
