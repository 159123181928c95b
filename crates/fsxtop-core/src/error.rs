// ── Core error types ──
//
// User-facing errors from fsxtop-core. Consumers never see SDK errors
// directly: the `From<fsxtop_api::Error>` impl folds them into `Api`.
// During steady-state polling errors are logged and swallowed; the only
// error a running system surfaces is `ResourceNotFound` at detail start.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lookup errors ────────────────────────────────────────────────
    #[error("File system not found: {id}")]
    ResourceNotFound { id: String },

    #[error("Unsupported file system type: {kind}")]
    UnsupportedKind { kind: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api { message: String, transient: bool },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ResourceNotFound { .. })
    }
}

// ── Conversion from backend errors ───────────────────────────────────

impl From<fsxtop_api::Error> for CoreError {
    fn from(err: fsxtop_api::Error) -> Self {
        let transient = err.is_transient();
        CoreError::Api {
            message: err.to_string(),
            transient,
        }
    }
}
