// ── Page-count store ──
//
// The fixed schema hpmon keeps its samples in, and the three store steps of
// a cycle: bootstrap, last-update lookup, and sample write. Everything here
// works on a path so each step opens the file fresh.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use hpmon_api::Counters;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::rrd::{ArchiveDef, DataSourceDef, Rrd, RrdError, Schema};

/// Base step of the store, seconds.
pub const STEP_SECS: u32 = 3600;

/// Longest gap between samples before the interval counts as unknown.
pub const HEARTBEAT_SECS: u32 = 7200;

pub const SIMPLEX_DS: &str = "letter-simplex";
pub const DUPLEX_DS: &str = "letter-duplex";

/// Data sources in the order samples are written.
pub const TEMPLATE: [&str; 2] = [SIMPLEX_DS, DUPLEX_DS];

pub const ARCHIVE_XFF: f64 = 0.5;
pub const ARCHIVE_ROWS: usize = 168;

/// 2015-07-01T00:00:00Z, the last-update time of a fresh store.
pub const START_UNIX: i64 = 1_435_708_800;

pub fn start() -> DateTime<Utc> {
    Utc.timestamp_opt(START_UNIX, 0).single().unwrap_or_default()
}

/// Two unbounded gauges and one week of hourly averages.
pub fn usage_schema() -> Schema {
    Schema::new(STEP_SECS)
        .data_source(DataSourceDef::gauge(SIMPLEX_DS, HEARTBEAT_SECS))
        .data_source(DataSourceDef::gauge(DUPLEX_DS, HEARTBEAT_SECS))
        .archive(ArchiveDef::average(ARCHIVE_XFF, 1, ARCHIVE_ROWS))
}

/// What [`ensure_store`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bootstrap {
    Created,
    AlreadyPresent,
}

/// Create the store at `path` unless something is already there.
///
/// An existing file is left untouched and is not inspected; a file of the
/// wrong shape surfaces at the next read.
pub fn ensure_store(path: &Path) -> Result<Bootstrap, CoreError> {
    let create_err = |source| CoreError::StoreCreate {
        path: path.to_path_buf(),
        source,
    };

    let rrd = Rrd::new(&usage_schema(), START_UNIX).map_err(create_err)?;
    match rrd.create(path) {
        Ok(()) => {
            info!(path = %path.display(), "created store");
            Ok(Bootstrap::Created)
        }
        Err(RrdError::AlreadyExists(_)) => {
            debug!(path = %path.display(), "store already present");
            Ok(Bootstrap::AlreadyPresent)
        }
        Err(e) => Err(create_err(e)),
    }
}

/// Time of the store's last accepted sample, unix seconds.
pub fn last_update(path: &Path) -> Result<i64, CoreError> {
    Rrd::open(path)
        .map(|rrd| rrd.last_update())
        .map_err(|source| CoreError::StoreRead {
            path: path.to_path_buf(),
            source,
        })
}

/// Record one observation of both counters at `at` (unix seconds).
///
/// `at` must be after the store's last update.
pub fn write_sample(path: &Path, at: i64, counters: Counters) -> Result<(), CoreError> {
    let write_err = |source| CoreError::StoreWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut rrd = Rrd::open(path).map_err(write_err)?;
    rrd.update_with_template(
        at,
        &TEMPLATE,
        &[Some(count(counters.simplex)), Some(count(counters.duplex))],
    )
    .map_err(write_err)?;
    rrd.save(path).map_err(write_err)?;

    debug!(at, simplex = counters.simplex, duplex = counters.duplex, "sample written");
    Ok(())
}

/// Page counts stay far below 2^53, so the conversion is exact in practice.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn count(n: u64) -> f64 {
    n as f64
}
