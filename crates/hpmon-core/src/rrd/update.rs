// ── Update and consolidation ──
//
// An update covers the interval (last_update, ts]. That interval is cut at
// step boundaries: the piece up to the first boundary completes the PDP in
// progress, whole steps in between become PDPs holding the interval's rate,
// and the tail after the last boundary starts the next PDP.

use super::error::RrdError;
use super::{Archive, CdpPrep, DataSource, DsKind, PdpPrep, Rrd, Row};

impl Rrd {
    /// Record `values` (one per data source, in definition order) at `ts`.
    pub fn update(&mut self, ts: i64, values: &[Option<f64>]) -> Result<(), RrdError> {
        if values.len() != self.data_sources.len() {
            return Err(RrdError::ValueCount {
                expected: self.data_sources.len(),
                got: values.len(),
            });
        }
        if ts <= self.last_update {
            return Err(RrdError::IllegalUpdate {
                timestamp: ts,
                last_update: self.last_update,
            });
        }

        let step = i64::from(self.step);
        let interval = ts - self.last_update;
        let proc_pdp_st = self.last_update - self.last_update.rem_euclid(step);
        let occu_pdp_st = ts - ts.rem_euclid(step);

        let rates: Vec<Option<f64>> = self
            .data_sources
            .iter()
            .zip(values)
            .map(|(ds, value)| ds.rate(*value, interval))
            .collect();

        if occu_pdp_st == proc_pdp_st {
            for (ds, rate) in self.data_sources.iter_mut().zip(&rates) {
                ds.prep.accumulate(*rate, interval);
            }
        } else {
            let pre_int = proc_pdp_st + step - self.last_update;
            let post_int = ts - occu_pdp_st;
            let elapsed = (occu_pdp_st - proc_pdp_st) / step;

            let mut first: Row = Vec::with_capacity(rates.len());
            for (ds, rate) in self.data_sources.iter_mut().zip(&rates) {
                ds.prep.accumulate(*rate, pre_int);
                first.push(ds.prep.finish(step, i64::from(ds.def.heartbeat)));
                ds.prep.value = 0.0;
                ds.prep.unknown_secs = 0;
                ds.prep.accumulate(*rate, post_int);
            }

            let first_end = proc_pdp_st + step;
            for archive in &mut self.archives {
                archive.push_pdp(&first, first_end, step);
                if elapsed > 1 {
                    archive.push_run(&rates, elapsed - 1, first_end + step, step);
                }
            }
        }

        for (ds, value) in self.data_sources.iter_mut().zip(values) {
            ds.prep.last_value = *value;
        }
        self.last_update = ts;
        Ok(())
    }

    /// Like [`update`](Self::update), but `values` are matched to data
    /// sources by `names`. Sources left out of the template get unknown.
    pub fn update_with_template(
        &mut self,
        ts: i64,
        names: &[&str],
        values: &[Option<f64>],
    ) -> Result<(), RrdError> {
        if names.len() != values.len() {
            return Err(RrdError::ValueCount {
                expected: names.len(),
                got: values.len(),
            });
        }

        let mut ordered = vec![None; self.data_sources.len()];
        for (name, value) in names.iter().zip(values) {
            let idx = self
                .ds_index(name)
                .ok_or_else(|| RrdError::UnknownDataSource((*name).to_owned()))?;
            ordered[idx] = *value;
        }
        self.update(ts, &ordered)
    }
}

impl DataSource {
    /// Rate for a submitted value over `interval` seconds, or unknown.
    fn rate(&self, value: Option<f64>, interval: i64) -> Option<f64> {
        let value = value.filter(|v| v.is_finite())?;
        if interval > i64::from(self.def.heartbeat) {
            return None;
        }
        if self.def.min.is_some_and(|min| value < min) || self.def.max.is_some_and(|max| value > max) {
            return None;
        }
        match self.def.kind {
            DsKind::Gauge => Some(value),
        }
    }
}

impl PdpPrep {
    fn accumulate(&mut self, rate: Option<f64>, secs: i64) {
        match rate {
            Some(rate) => self.value += rate * secs_f64(secs),
            None => self.unknown_secs += secs,
        }
    }

    /// Value of the completed PDP: the time-weighted mean of its known part.
    fn finish(&self, step: i64, heartbeat: i64) -> Option<f64> {
        let known = step - self.unknown_secs;
        if known <= 0 || self.unknown_secs > heartbeat {
            None
        } else {
            Some(self.value / secs_f64(known))
        }
    }
}

impl CdpPrep {
    fn add(&mut self, value: Option<f64>) {
        match value {
            Some(v) => {
                self.sum += v;
                self.known += 1;
            }
            None => self.unknown += 1,
        }
    }

    /// Close the CDP and reset it.
    fn take(&mut self, pdp_per_row: u32, xff: f64) -> Option<f64> {
        let unknown_ratio = f64::from(self.unknown) / f64::from(pdp_per_row);
        let value = if self.known == 0 || unknown_ratio > xff {
            None
        } else {
            Some(self.sum / f64::from(self.known))
        };
        *self = Self::default();
        value
    }
}

impl Archive {
    /// Seconds covered by one row.
    pub(crate) fn row_span(&self, step: i64) -> i64 {
        step * i64::from(self.def.pdp_per_row)
    }

    /// Feed one PDP ending at `end`. Rows close on multiples of the row span.
    fn push_pdp(&mut self, values: &[Option<f64>], end: i64, step: i64) {
        for (cdp, value) in self.cdp.iter_mut().zip(values) {
            cdp.add(*value);
        }
        if end.rem_euclid(self.row_span(step)) == 0 {
            let (ppr, xff) = (self.def.pdp_per_row, self.def.xff);
            let row = self.cdp.iter_mut().map(|cdp| cdp.take(ppr, xff)).collect();
            self.write_row(row);
        }
    }

    /// Feed `count` identical PDPs, the first ending at `first_end`.
    ///
    /// Whole rows in the middle of the run are written directly; once the
    /// run is longer than the ring, only the last lap is visible.
    fn push_run(&mut self, values: &[Option<f64>], count: i64, first_end: i64, step: i64) {
        let ppr = i64::from(self.def.pdp_per_row);
        let mut remaining = count;
        let mut end = first_end;

        // Up to and including the first row boundary.
        let lead = (ppr - end.div_euclid(step).rem_euclid(ppr)) % ppr + 1;
        for _ in 0..lead.min(remaining) {
            self.push_pdp(values, end, step);
            end += step;
        }
        remaining -= lead.min(remaining);

        let full_rows = remaining / ppr;
        if full_rows > 0 {
            // A uniform run consolidates to the value itself, or unknown.
            let row: Row = values.to_vec();
            let ring = i64::try_from(self.data.len()).unwrap_or(i64::MAX);
            let writes = full_rows.min(ring);
            for _ in 0..writes {
                self.write_row(row.clone());
            }
            let skipped = usize::try_from((full_rows - writes).rem_euclid(ring)).unwrap_or(0);
            self.cur_row = (self.cur_row + skipped) % self.data.len();
            end += full_rows * ppr * step;
            remaining -= full_rows * ppr;
        }

        for _ in 0..remaining {
            self.push_pdp(values, end, step);
            end += step;
        }
    }

    fn write_row(&mut self, row: Row) {
        self.cur_row = (self.cur_row + 1) % self.data.len();
        self.data[self.cur_row] = row;
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn secs_f64(secs: i64) -> f64 {
    secs as f64
}
