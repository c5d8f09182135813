// ── Store definitions ──
//
// A schema is what gets handed to `Rrd::new`: base step, data sources,
// archives. Built with chained calls and validated once at creation.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RrdError;

/// Longest data-source name accepted.
pub const MAX_DS_NAME_LEN: usize = 19;

/// How a data source turns submitted values into rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DsKind {
    /// The value is stored as-is.
    Gauge,
}

impl fmt::Display for DsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => f.write_str("GAUGE"),
        }
    }
}

/// Consolidation function applied when primary points roll into a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Consolidation {
    Average,
}

impl fmt::Display for Consolidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Average => f.write_str("AVERAGE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceDef {
    pub name: String,
    pub kind: DsKind,
    /// Longest gap (seconds) between updates before the value goes unknown.
    pub heartbeat: u32,
    /// `None` means unbounded.
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DataSourceDef {
    /// Unbounded gauge.
    pub fn gauge(name: impl Into<String>, heartbeat: u32) -> Self {
        Self {
            name: name.into(),
            kind: DsKind::Gauge,
            heartbeat,
            min: None,
            max: None,
        }
    }

    pub fn bounded(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDef {
    pub cf: Consolidation,
    /// Fraction of a row's primary points that may be unknown before the
    /// row itself is unknown.
    pub xff: f64,
    pub pdp_per_row: u32,
    pub rows: usize,
}

impl ArchiveDef {
    pub fn average(xff: f64, pdp_per_row: u32, rows: usize) -> Self {
        Self {
            cf: Consolidation::Average,
            xff,
            pdp_per_row,
            rows,
        }
    }
}

/// Full definition of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Base step in seconds.
    pub step: u32,
    pub data_sources: Vec<DataSourceDef>,
    pub archives: Vec<ArchiveDef>,
}

impl Schema {
    pub fn new(step: u32) -> Self {
        Self {
            step,
            data_sources: Vec::new(),
            archives: Vec::new(),
        }
    }

    pub fn data_source(mut self, def: DataSourceDef) -> Self {
        self.data_sources.push(def);
        self
    }

    pub fn archive(mut self, def: ArchiveDef) -> Self {
        self.archives.push(def);
        self
    }

    pub fn validate(&self) -> Result<(), RrdError> {
        if self.step == 0 {
            return Err(RrdError::Schema("step must be positive".into()));
        }
        if self.data_sources.is_empty() {
            return Err(RrdError::Schema("at least one data source is required".into()));
        }
        if self.archives.is_empty() {
            return Err(RrdError::Schema("at least one archive is required".into()));
        }

        let mut seen = HashSet::new();
        for ds in &self.data_sources {
            validate_ds_name(&ds.name)?;
            if !seen.insert(ds.name.as_str()) {
                return Err(RrdError::Schema(format!(
                    "duplicate data source '{}'",
                    ds.name
                )));
            }
            if ds.heartbeat == 0 {
                return Err(RrdError::Schema(format!(
                    "data source '{}': heartbeat must be positive",
                    ds.name
                )));
            }
            if let (Some(min), Some(max)) = (ds.min, ds.max) {
                if min > max {
                    return Err(RrdError::Schema(format!(
                        "data source '{}': min {min} exceeds max {max}",
                        ds.name
                    )));
                }
            }
        }

        for (idx, archive) in self.archives.iter().enumerate() {
            if !(0.0..1.0).contains(&archive.xff) {
                return Err(RrdError::Schema(format!(
                    "archive {idx}: xff must be in [0, 1), got {}",
                    archive.xff
                )));
            }
            if archive.pdp_per_row == 0 || archive.rows == 0 {
                return Err(RrdError::Schema(format!(
                    "archive {idx}: steps and rows must be positive"
                )));
            }
        }

        Ok(())
    }
}

fn validate_ds_name(name: &str) -> Result<(), RrdError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_DS_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if valid {
        Ok(())
    } else {
        Err(RrdError::Schema(format!(
            "invalid data source name '{name}' (1-{MAX_DS_NAME_LEN} chars of [A-Za-z0-9_-])"
        )))
    }
}
