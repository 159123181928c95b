//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct exit code per category.

use miette::Diagnostic;
use thiserror::Error;

use fsxtop_config::ConfigError;
use fsxtop_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const API: i32 = 5;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────
    #[error("Invalid usage: Region is required")]
    #[diagnostic(
        code(fsxtop::no_region),
        help("Set it with --region, the AWS_REGION environment variable, or `region` in {path}")
    )]
    MissingRegion { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fsxtop::validation))]
    Validation { field: String, reason: String },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("File system '{id}' not found")]
    #[diagnostic(
        code(fsxtop::not_found),
        help("Run: fsxtop list to see the file systems in this region")
    )]
    NotFound { id: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(fsxtop::api_error),
        help("Check AWS credentials, the selected profile, and network access to the region.")
    )]
    Api { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(fsxtop::config), help("Check the config file at {path}"))]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(fsxtop::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingRegion { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::Config { .. } => exit_code::CONFIG,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Api { .. } => exit_code::API,
            Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }

    /// Attach the config path a `ConfigError` came from.
    pub fn from_config(err: ConfigError, path: &std::path::Path) -> Self {
        let path = path.display().to_string();
        match err {
            ConfigError::MissingRegion => Self::MissingRegion { path },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Serialization(e) => Self::Config {
                message: e.to_string(),
                path,
            },
            ConfigError::Figment(e) => Self::Config {
                message: e.to_string(),
                path,
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ResourceNotFound { id } => Self::NotFound { id },
            CoreError::UnsupportedKind { kind } => Self::Validation {
                field: "file system type".into(),
                reason: format!("'{kind}' is not supported"),
            },
            CoreError::Api { message, .. } => Self::Api { message },
            CoreError::Config { message } => Self::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}
