// ── Read-side views: header info and archive series ──

use serde::Serialize;

use super::error::RrdError;
use super::{Consolidation, DsKind, Row, Rrd};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSourceInfo {
    pub name: String,
    pub kind: DsKind,
    pub heartbeat: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub last_value: Option<f64>,
    pub unknown_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveInfo {
    pub cf: Consolidation,
    pub xff: f64,
    pub pdp_per_row: u32,
    pub rows: usize,
    pub cur_row: usize,
}

/// Summary of a store's header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RrdInfo {
    pub step: u32,
    pub last_update: i64,
    pub data_sources: Vec<DataSourceInfo>,
    pub archives: Vec<ArchiveInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    /// End of the row's time span, unix seconds.
    pub time: i64,
    pub values: Row,
}

/// Rows of one archive, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub cf: Consolidation,
    /// Seconds covered by each row.
    pub resolution: i64,
    pub names: Vec<String>,
    pub rows: Vec<SeriesRow>,
}

impl Rrd {
    pub fn info(&self) -> RrdInfo {
        RrdInfo {
            step: self.step,
            last_update: self.last_update,
            data_sources: self
                .data_sources
                .iter()
                .map(|ds| DataSourceInfo {
                    name: ds.def.name.clone(),
                    kind: ds.def.kind,
                    heartbeat: ds.def.heartbeat,
                    min: ds.def.min,
                    max: ds.def.max,
                    last_value: ds.prep.last_value,
                    unknown_secs: ds.prep.unknown_secs,
                })
                .collect(),
            archives: self
                .archives
                .iter()
                .map(|a| ArchiveInfo {
                    cf: a.def.cf,
                    xff: a.def.xff,
                    pdp_per_row: a.def.pdp_per_row,
                    rows: a.def.rows,
                    cur_row: a.cur_row,
                })
                .collect(),
        }
    }

    /// Rows of the first `cf` archive with `start < time <= end`.
    pub fn fetch(&self, cf: Consolidation, start: i64, end: i64) -> Result<Series, RrdError> {
        let archive = self
            .archives
            .iter()
            .find(|a| a.def.cf == cf)
            .ok_or_else(|| RrdError::NoArchive(cf.to_string()))?;

        let step = i64::from(self.step);
        let span = archive.row_span(step);
        let newest_end = self.last_update - self.last_update.rem_euclid(span);
        let len = archive.data.len();
        let ring = i64::try_from(len).unwrap_or(i64::MAX);

        let mut rows = Vec::new();
        let mut time = newest_end - span * (ring - 1);
        for offset in 0..len {
            if time > start && time <= end {
                let idx = (archive.cur_row + 1 + offset) % len;
                rows.push(SeriesRow {
                    time,
                    values: archive.data[idx].clone(),
                });
            }
            time += span;
        }

        Ok(Series {
            cf,
            resolution: span,
            names: self.data_sources.iter().map(|ds| ds.def.name.clone()).collect(),
            rows,
        })
    }
}
