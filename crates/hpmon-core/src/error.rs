// ── Core error types ──
//
// Cycle-level errors from hpmon-core. Every variant ends the cycle: there is
// no partial success. The `From<hpmon_api::Error>` impl folds transport and
// markup errors into this taxonomy so callers never match on reqwest types.

use std::path::PathBuf;

use thiserror::Error;

use crate::rrd::RrdError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Certificate verification failed for {url}: {reason}")]
    TlsVerification { url: String, reason: String },

    #[error("Trust anchor unusable: {message}")]
    TrustAnchor { message: String },

    #[error("Cannot reach printer: {reason}")]
    Network { reason: String },

    #[error("Printer answered HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Cannot read saved usage page {}", .path.display())]
    PageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Extraction errors ────────────────────────────────────────────
    #[error("Usage page could not be parsed: {message}")]
    ParseFailure { message: String },

    #[error("Counter cell '{cell}' not found in usage page")]
    PathNotFound { cell: &'static str },

    #[error("Counter cell '{cell}' is not a page count: {text:?}")]
    NumericFormat { cell: &'static str, text: String },

    // ── Store errors ─────────────────────────────────────────────────
    #[error("Failed to create store {}", .path.display())]
    StoreCreate {
        path: PathBuf,
        #[source]
        source: RrdError,
    },

    #[error("Failed to read store {}", .path.display())]
    StoreRead {
        path: PathBuf,
        #[source]
        source: RrdError,
    },

    #[error("Failed to write sample to {}", .path.display())]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: RrdError,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Short name of the pipeline step that failed, for log lines.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::TlsVerification { .. }
            | Self::TrustAnchor { .. }
            | Self::Network { .. }
            | Self::HttpStatus { .. }
            | Self::PageRead { .. } => "fetch",
            Self::ParseFailure { .. } | Self::PathNotFound { .. } | Self::NumericFormat { .. } => {
                "extract"
            }
            Self::StoreCreate { .. } => "bootstrap",
            Self::StoreRead { .. } => "throttle",
            Self::StoreWrite { .. } => "write",
            Self::Config { .. } => "config",
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hpmon_api::Error> for CoreError {
    fn from(err: hpmon_api::Error) -> Self {
        match err {
            hpmon_api::Error::Tls(message) => CoreError::TrustAnchor { message },
            hpmon_api::Error::TlsVerification { url, source } => CoreError::TlsVerification {
                url,
                reason: chain(&source),
            },
            hpmon_api::Error::Transport(ref e) => CoreError::Network {
                reason: chain(e),
            },
            hpmon_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid printer URL: {e}"),
            },
            hpmon_api::Error::HttpStatus { status, url } => CoreError::HttpStatus { status, url },
            hpmon_api::Error::Parse(message) => CoreError::ParseFailure { message },
            hpmon_api::Error::PathNotFound { cell } => CoreError::PathNotFound { cell },
            hpmon_api::Error::NumericFormat { cell, text } => {
                CoreError::NumericFormat { cell, text }
            }
        }
    }
}

/// Render an error with its sources, since reqwest's top-level message
/// rarely says what went wrong.
fn chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}
