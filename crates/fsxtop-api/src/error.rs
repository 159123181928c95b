use aws_sdk_fsx::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Service error codes that indicate throttling rather than a real failure.
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "LimitExceededException",
];

/// Top-level error type for the `fsxtop-api` crate.
///
/// Covers every failure mode of the two backend surfaces (resource
/// listing and metric queries). `fsxtop-core` maps these into its own
/// domain errors and never exposes SDK types to callers.
#[derive(Debug, Error)]
pub enum Error {
    // ── Backend ─────────────────────────────────────────────────────
    /// A backend call failed. `message` carries the full SDK error chain.
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
        /// Throttling, timeouts and dispatch failures are worth retrying next cycle.
        transient: bool,
    },

    // ── Request construction ────────────────────────────────────────
    /// A request could not be built from the supplied parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A metric batch exceeded the backend's per-request query limit.
    #[error("Too many metric queries in one request: {count} (limit {limit})")]
    TooManyQueries { count: usize, limit: usize },
}

impl Error {
    /// Returns `true` if a later attempt may succeed without any change
    /// on the caller's side.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Service { transient: true, .. })
    }
}

/// Flatten an SDK error into [`Error::Service`].
///
/// Works for every AWS SDK crate since they share the smithy runtime
/// error types.
pub(crate) fn from_sdk<E, R>(operation: &'static str, err: &SdkError<E, R>) -> Error
where
    E: std::error::Error + ProvideErrorMetadata + 'static,
    R: std::fmt::Debug,
{
    let transient = match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => true,
        _ => err.code().is_some_and(|code| THROTTLING_CODES.contains(&code)),
    };
    Error::Service {
        operation,
        message: DisplayErrorContext(err).to_string(),
        transient,
    }
}
