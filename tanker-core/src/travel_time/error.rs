//! Travel-time failures.

use thiserror::Error;

/// Errors from travel-time sources.
///
/// [`LayeredEstimator`](super::LayeredEstimator) swallows every variant and
/// falls through to the next tier; only bulk matrix construction and the
/// mapping providers surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TravelTimeError {
    /// No locations were provided.
    ///
    /// A travel matrix needs at least the depot.
    #[error("at least one location is required")]
    EmptyInput,
    /// The mapping service did not answer within the per-call timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// URL that was requested.
        url: String,
        /// Timeout that elapsed.
        timeout_secs: u64,
    },
    /// The mapping service answered with a non-success HTTP status.
    #[error("request to {url} failed with status {status}: {message}")]
    HttpError {
        /// URL that was requested.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail.
        message: String,
    },
    /// The request never reached the service.
    #[error("network error requesting {url}: {message}")]
    NetworkError {
        /// URL that was requested.
        url: String,
        /// Error detail.
        message: String,
    },
    /// The service answered but reported a routing failure.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Service status code, e.g. `NoRoute`.
        code: String,
        /// Error detail.
        message: String,
    },
    /// The payload could not be interpreted.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Error detail.
        message: String,
    },
}
