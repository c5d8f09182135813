//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text, and each error into a process exit code.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use hpmon_config::ConfigError;
use hpmon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const TLS: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const PARSE: i32 = 8;
    pub const STORE: i32 = 9;
    pub const CONFIG: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── TLS ──────────────────────────────────────────────────────────
    #[error("Printer certificate rejected for {url}")]
    #[diagnostic(
        code(hpmon::tls_verification),
        help(
            "The printer's certificate does not chain to the configured ca-cert.\n\
             Export the printer's CA from its web interface and point ca-cert at it.\n\
             Cause: {reason}"
        )
    )]
    TlsVerification { url: String, reason: String },

    #[error("Trust anchor unusable: {message}")]
    #[diagnostic(
        code(hpmon::trust_anchor),
        help("ca-cert must name a readable PEM file with at least one certificate.")
    )]
    TrustAnchor { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the printer")]
    #[diagnostic(
        code(hpmon::connection_failed),
        help(
            "Check that the printer is powered on and printer.host / printer.port are right.\n\
             Cause: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Printer answered HTTP {status} for {url}")]
    #[diagnostic(
        code(hpmon::http_status),
        help("The embedded web server may be restarting, or this model serves its usage page elsewhere.")
    )]
    HttpStatus { status: u16, url: String },

    // ── Extraction ───────────────────────────────────────────────────
    #[error("Could not read page counters: {message}")]
    #[diagnostic(
        code(hpmon::extraction),
        help(
            "The usage page did not have the expected tbl-1851 layout.\n\
             Save the page and try: hpmon extract usage.html -v"
        )
    )]
    Extraction { message: String },

    // ── Store ────────────────────────────────────────────────────────
    #[error("Store error during {operation}: {message}")]
    #[diagnostic(
        code(hpmon::store),
        help("Store file: {path}\nCheck permissions, free space, and that no other hpmon run holds it.")
    )]
    Store {
        operation: &'static str,
        path: String,
        message: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found")]
    #[diagnostic(
        code(hpmon::no_config),
        help(
            "Create one with printer.host, ca-cert and rrdfile.\n\
             Expected at: {path}\n\
             Or pass --config / set HPMON_CONFIG."
        )
    )]
    NoConfig { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hpmon::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(hpmon::config))]
    Config(Box<ConfigError>),

    #[error("Cannot open log file {}: {reason}", .path.display())]
    #[diagnostic(code(hpmon::log_file))]
    LogFile { path: PathBuf, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TlsVerification { .. } | Self::TrustAnchor { .. } => exit_code::TLS,
            Self::ConnectionFailed { .. } | Self::HttpStatus { .. } => exit_code::CONNECTION,
            Self::Extraction { .. } => exit_code::PARSE,
            Self::Store { .. } => exit_code::STORE,
            Self::NoConfig { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::LogFile { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let operation = err.operation();
        match err {
            CoreError::TlsVerification { url, reason } => {
                CliError::TlsVerification { url, reason }
            }
            CoreError::TrustAnchor { message } => CliError::TrustAnchor { message },
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },
            CoreError::HttpStatus { status, url } => CliError::HttpStatus { status, url },

            e @ (CoreError::ParseFailure { .. }
            | CoreError::PathNotFound { .. }
            | CoreError::NumericFormat { .. }
            | CoreError::PageRead { .. }) => CliError::Extraction {
                message: e.to_string(),
            },

            CoreError::StoreCreate { path, source }
            | CoreError::StoreRead { path, source }
            | CoreError::StoreWrite { path, source } => CliError::Store {
                operation,
                path: path.display().to_string(),
                message: source.to_string(),
            },

            CoreError::Config { message } => CliError::Validation {
                field: "printer".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let tls = CliError::from(CoreError::TlsVerification {
            url: "https://printer/".into(),
            reason: "UnknownIssuer".into(),
        });
        assert_eq!(tls.exit_code(), exit_code::TLS);

        let net = CliError::from(CoreError::Network {
            reason: "connection refused".into(),
        });
        assert_eq!(net.exit_code(), exit_code::CONNECTION);

        let cell = CliError::from(CoreError::NumericFormat {
            cell: "duplex",
            text: "N/A".into(),
        });
        assert_eq!(cell.exit_code(), exit_code::PARSE);
        assert!(cell.to_string().contains("duplex"));
    }

    #[test]
    fn config_errors_map_to_config_exit_code() {
        let missing = CliError::from(ConfigError::NotFound {
            path: "conf.toml".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::CONFIG);

        let invalid = CliError::from(ConfigError::Validation {
            field: "printer.host".into(),
            reason: "is required".into(),
        });
        assert!(matches!(invalid, CliError::Validation { ref field, .. } if field == "printer.host"));
    }
}
