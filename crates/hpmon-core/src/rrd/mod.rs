// ── Round-robin time-series store ──
//
// A fixed-size file: a header (step, last update, data sources) plus one or
// more archives, each a ring of consolidated rows. Updates are split at step
// boundaries into primary data points (PDPs), which archives fold into
// consolidated data points (CDPs) and then rows.
//
// The on-disk form is the serde_json encoding of `Rrd`. Every row slot is
// always present, so the file size does not grow after creation.

mod error;
mod file;
mod query;
mod schema;
mod update;

use serde::{Deserialize, Serialize};

pub use error::RrdError;
pub use query::{ArchiveInfo, DataSourceInfo, RrdInfo, Series, SeriesRow};
pub use schema::{ArchiveDef, Consolidation, DataSourceDef, DsKind, Schema, MAX_DS_NAME_LEN};

/// Value of the `format` header field.
pub const FORMAT: &str = "hpmon-rrd";

/// Current file layout version.
pub const VERSION: u32 = 1;

/// One consolidated row: a value (or unknown) per data source.
pub type Row = Vec<Option<f64>>;

/// The primary data point being built for a data source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdpPrep {
    /// Sum of `rate * seconds` over the known part of the step so far.
    pub value: f64,
    /// Seconds of the step so far with no known rate.
    pub unknown_secs: i64,
    /// Last value submitted, as given.
    pub last_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(flatten)]
    pub def: DataSourceDef,
    pub prep: PdpPrep,
}

/// The consolidated data point being built for one data source in one archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CdpPrep {
    pub sum: f64,
    pub known: u32,
    pub unknown: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    #[serde(flatten)]
    pub def: ArchiveDef,
    /// Index of the most recently written row.
    pub cur_row: usize,
    pub cdp: Vec<CdpPrep>,
    /// The ring itself, `def.rows` slots long.
    pub data: Vec<Row>,
}

/// An open round-robin store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rrd {
    format: String,
    version: u32,
    step: u32,
    last_update: i64,
    data_sources: Vec<DataSource>,
    archives: Vec<Archive>,
}

impl Rrd {
    /// Build an empty store whose clock starts at `start` (unix seconds).
    ///
    /// The part of the first step before `start` counts as unknown.
    pub fn new(schema: &Schema, start: i64) -> Result<Self, RrdError> {
        schema.validate()?;

        let step = i64::from(schema.step);
        let ds_count = schema.data_sources.len();

        let data_sources = schema
            .data_sources
            .iter()
            .map(|def| DataSource {
                def: def.clone(),
                prep: PdpPrep {
                    unknown_secs: start.rem_euclid(step),
                    ..PdpPrep::default()
                },
            })
            .collect();

        let archives = schema
            .archives
            .iter()
            .map(|def| Archive {
                def: def.clone(),
                cur_row: 0,
                cdp: vec![CdpPrep::default(); ds_count],
                data: vec![vec![None; ds_count]; def.rows],
            })
            .collect();

        Ok(Self {
            format: FORMAT.into(),
            version: VERSION,
            step: schema.step,
            last_update: start,
            data_sources,
            archives,
        })
    }

    /// Base step in seconds.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Time of the last accepted update, unix seconds.
    pub fn last_update(&self) -> i64 {
        self.last_update
    }

    pub fn data_sources(&self) -> &[DataSource] {
        &self.data_sources
    }

    pub fn archives(&self) -> &[Archive] {
        &self.archives
    }

    pub fn ds_index(&self, name: &str) -> Option<usize> {
        self.data_sources.iter().position(|ds| ds.def.name == name)
    }

    /// Structural checks on a decoded store.
    fn check(&self) -> Result<(), RrdError> {
        if self.format != FORMAT {
            return Err(RrdError::Corrupt(format!(
                "unexpected format '{}'",
                self.format
            )));
        }
        if self.version != VERSION {
            return Err(RrdError::Corrupt(format!(
                "unsupported version {}",
                self.version
            )));
        }

        let schema = Schema {
            step: self.step,
            data_sources: self.data_sources.iter().map(|ds| ds.def.clone()).collect(),
            archives: self.archives.iter().map(|a| a.def.clone()).collect(),
        };
        schema
            .validate()
            .map_err(|e| RrdError::Corrupt(e.to_string()))?;

        let ds_count = self.data_sources.len();
        for (idx, archive) in self.archives.iter().enumerate() {
            if archive.data.len() != archive.def.rows {
                return Err(RrdError::Corrupt(format!(
                    "archive {idx}: {} rows stored, {} declared",
                    archive.data.len(),
                    archive.def.rows
                )));
            }
            if archive.cur_row >= archive.data.len() {
                return Err(RrdError::Corrupt(format!(
                    "archive {idx}: current row {} out of range",
                    archive.cur_row
                )));
            }
            if archive.cdp.len() != ds_count || archive.data.iter().any(|r| r.len() != ds_count) {
                return Err(RrdError::Corrupt(format!(
                    "archive {idx}: width does not match {ds_count} data sources"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new(300)
            .data_source(DataSourceDef::gauge("a", 600))
            .data_source(DataSourceDef::gauge("b", 600))
            .archive(ArchiveDef::average(0.5, 1, 12))
            .archive(ArchiveDef::average(0.5, 6, 4))
    }

    #[test]
    fn new_store_is_empty_and_sized() {
        let rrd = Rrd::new(&schema(), 3_000).unwrap();
        assert_eq!(rrd.last_update(), 3_000);
        assert_eq!(rrd.archives()[0].data.len(), 12);
        assert_eq!(rrd.archives()[1].data.len(), 4);
        assert!(rrd.archives()[0].data.iter().flatten().all(Option::is_none));
        assert_eq!(rrd.ds_index("b"), Some(1));
        assert_eq!(rrd.ds_index("c"), None);
        assert!(rrd.check().is_ok());
    }

    #[test]
    fn unaligned_start_marks_head_of_step_unknown() {
        let rrd = Rrd::new(&schema(), 3_100).unwrap();
        assert_eq!(rrd.data_sources()[0].prep.unknown_secs, 100);
    }

    #[test]
    fn check_rejects_tampered_shape() {
        let mut rrd = Rrd::new(&schema(), 0).unwrap();
        rrd.archives[0].data.pop();
        assert!(matches!(rrd.check(), Err(RrdError::Corrupt(_))));

        let mut rrd = Rrd::new(&schema(), 0).unwrap();
        rrd.version = 99;
        assert!(matches!(rrd.check(), Err(RrdError::Corrupt(_))));
    }
}
