use std::path::PathBuf;

use thiserror::Error;

/// Errors from the round-robin store engine.
#[derive(Debug, Error)]
pub enum RrdError {
    // ── File ─────────────────────────────────────────────────────────
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed store {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt store: {0}")]
    Corrupt(String),

    // ── Definition ──────────────────────────────────────────────────
    #[error("invalid schema: {0}")]
    Schema(String),

    // ── Update ───────────────────────────────────────────────────────
    #[error("illegal update: timestamp {timestamp} is not after last update {last_update}")]
    IllegalUpdate { timestamp: i64, last_update: i64 },

    #[error("expected {expected} values, got {got}")]
    ValueCount { expected: usize, got: usize },

    #[error("unknown data source '{0}'")]
    UnknownDataSource(String),

    #[error("no {0} archive in store")]
    NoArchive(String),
}

impl RrdError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
